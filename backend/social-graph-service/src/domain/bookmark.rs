use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub bookmark_id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    #[serde(default)]
    pub collection_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookmarkCreate {
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkCollection {
    pub collection_id: Uuid,
    pub title: String,
    pub owned_by: Uuid,
    #[serde(default)]
    pub bookmark_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CollectionTitle {
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_title_rules() {
        assert!(CollectionTitle {
            title: "Recipes".into()
        }
        .validate()
        .is_ok());
        assert!(CollectionTitle { title: "".into() }.validate().is_err());
        assert!(CollectionTitle {
            title: "x".repeat(101)
        }
        .validate()
        .is_err());
    }
}
