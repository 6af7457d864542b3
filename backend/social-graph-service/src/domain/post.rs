use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: Uuid,
    pub creator_id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default = "default_true")]
    pub allows_comments: bool,
    pub video_s3_key: String,
    #[serde(default)]
    pub thumbnail_s3_key: Option<String>,
    #[serde(default)]
    pub duration_seconds: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub share_count: i64,
    #[serde(default)]
    pub bookmark_count: i64,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f64>>,
}

fn default_true() -> bool {
    true
}

/// Storage keys point at objects uploaded out of band
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostCreate {
    #[validate(length(max = 150))]
    pub title: Option<String>,
    #[validate(length(max = 2200))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default = "default_true")]
    pub allows_comments: bool,
    #[validate(length(min = 1))]
    pub video_s3_key: String,
    pub thumbnail_s3_key: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostUpdate {
    #[validate(length(max = 150))]
    pub title: Option<String>,
    #[validate(length(max = 2200))]
    pub description: Option<String>,
    #[validate(length(max = 30))]
    pub hashtags: Option<Vec<String>>,
    pub is_private: Option<bool>,
    pub allows_comments: Option<bool>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.hashtags.is_none()
            && self.is_private.is_none()
            && self.allows_comments.is_none()
    }
}

/// Hashtags are stored lowercase without the leading `#`
pub fn normalize_hashtags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let t = tag.trim().trim_start_matches('#').to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hashtags() {
        let tags = vec![
            "#Rust".to_string(),
            "rust".to_string(),
            "  #Dating ".to_string(),
            "#".to_string(),
        ];
        assert_eq!(normalize_hashtags(&tags), vec!["rust", "dating"]);
    }

    #[test]
    fn test_post_create_requires_video_key() {
        let payload: PostCreate = serde_json::from_value(serde_json::json!({
            "title": "hello",
            "video_s3_key": ""
        }))
        .unwrap();
        assert!(payload.validate().is_err());
        assert!(payload.allows_comments);
    }

    #[test]
    fn test_empty_update_detected() {
        assert!(PostUpdate::default().is_empty());
        let update = PostUpdate {
            is_private: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
