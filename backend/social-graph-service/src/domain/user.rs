use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User node as stored in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    #[serde(default, skip_serializing)]
    pub auth_id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub profile_picture_s3_key: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub follower_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub post_count: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// FastRP embedding written by the analytics refresh
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f64>>,
}

impl User {
    pub fn location(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Fields visible to viewers who may not see a private profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitedProfile {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub is_private: bool,
    pub profile_picture_s3_key: Option<String>,
}

impl From<&User> for LimitedProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            is_private: user.is_private,
            profile_picture_s3_key: user.profile_picture_s3_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Full(Box<User>),
    Limited(LimitedProfile),
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 50))]
    pub display_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub is_private: Option<bool>,
    pub profile_picture_s3_key: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.bio.is_none()
            && self.is_private.is_none()
            && self.profile_picture_s3_key.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocationUpdate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Normalized profile returned by the identity provider's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProfile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl IdentityProfile {
    pub fn preferred_nickname(&self) -> String {
        self.nickname
            .clone()
            .or_else(|| self.email.split('@').next().map(str::to_string))
            .unwrap_or_else(|| "user".to_string())
    }

    pub fn preferred_display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.preferred_nickname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            user_id: Uuid::new_v4(),
            auth_id: "auth0|1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            display_name: "Alice".to_string(),
            profile_picture_s3_key: Some("pics/alice.png".to_string()),
            bio: None,
            is_private: true,
            created_at: Utc::now(),
            updated_at: None,
            follower_count: 3,
            following_count: 1,
            likes_count: 0,
            post_count: 0,
            latitude: Some(40.0),
            longitude: None,
            location_updated_at: None,
            interests: vec![],
            embedding: Some(vec![0.1, 0.2]),
        }
    }

    #[test]
    fn test_location_requires_both_coordinates() {
        let mut user = sample_user();
        assert_eq!(user.location(), None);
        user.longitude = Some(-73.0);
        assert_eq!(user.location(), Some((40.0, -73.0)));
    }

    #[test]
    fn test_limited_profile_drops_private_fields() {
        let user = sample_user();
        let limited = LimitedProfile::from(&user);
        let json = serde_json::to_value(ProfileView::Limited(limited)).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("email").is_none());
        assert!(json.get("follower_count").is_none());
    }

    #[test]
    fn test_embedding_and_auth_id_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("embedding").is_none());
        assert!(json.get("auth_id").is_none());
    }

    #[test]
    fn test_location_update_ranges() {
        assert!(LocationUpdate {
            latitude: 90.0,
            longitude: -180.0
        }
        .validate()
        .is_ok());
        assert!(LocationUpdate {
            latitude: 91.0,
            longitude: 0.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_identity_profile_fallbacks() {
        let profile = IdentityProfile {
            sub: "google-oauth2|1".to_string(),
            email: "bob@example.com".to_string(),
            name: None,
            nickname: None,
            picture: None,
        };
        assert_eq!(profile.preferred_nickname(), "bob");
        assert_eq!(profile.preferred_display_name(), "bob");
    }
}
