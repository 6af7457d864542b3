/// Token validation against the identity provider's JWKS and first-login
/// user provisioning.
use crate::config::AuthConfig;
use crate::db::{self, nullable, GraphClient};
use crate::domain::user::{IdentityProfile, User};
use crate::error::{AppError, Result};
use crate::metrics::USERS_PROVISIONED_TOTAL;
use crate::validators::{normalize_username_base, username_candidate};
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use neo4rs::query;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

const JWKS_CACHE_KEY: &str = "jwks";
const MAX_USERNAME_ATTEMPTS: u32 = 1000;

/// JSON Web Key, RSA subset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default, rename = "use")]
    pub use_: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys
            .iter()
            .find(|k| k.kid.as_deref() == Some(kid) && k.kty == "RSA")
    }
}

/// Validated access-token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Remote side of authentication
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current signing keys
    async fn fetch_jwks(&self) -> Result<JwkSet>;

    /// Profile of the token's subject
    async fn fetch_profile(&self, access_token: &str) -> Result<IdentityProfile>;
}

/// OIDC provider reached over HTTPS
pub struct OidcProvider {
    http: reqwest::Client,
    jwks_url: String,
    userinfo_url: String,
}

impl OidcProvider {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            jwks_url: config.jwks_url(),
            userinfo_url: config.userinfo_url(),
        })
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    async fn fetch_jwks(&self) -> Result<JwkSet> {
        debug!("Fetching JWKS from {}", self.jwks_url);
        let response = self.http.get(&self.jwks_url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::IdentityProvider(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }
        Ok(response.json::<JwkSet>().await?)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<IdentityProfile> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Authentication(format!("Failed to get user profile: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(userinfo_rejection(status));
        }
        response
            .json::<IdentityProfile>()
            .await
            .map_err(|e| AppError::Authentication(format!("Failed to get user profile: {}", e)))
    }
}

/// Any userinfo failure means the token cannot be trusted
fn userinfo_rejection(status: reqwest::StatusCode) -> AppError {
    AppError::Authentication(format!(
        "Failed to get user profile: userinfo endpoint returned {}",
        status
    ))
}

/// RS256 validation with a TTL-cached key set
pub struct TokenValidator {
    provider: Arc<dyn IdentityProvider>,
    jwks: Cache<&'static str, Arc<JwkSet>>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.issuer()]);

        let jwks = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.jwks_cache_ttl_secs))
            .build();

        Self {
            provider,
            jwks,
            validation,
        }
    }

    async fn key_set(&self, refresh: bool) -> Result<Arc<JwkSet>> {
        if !refresh {
            if let Some(cached) = self.jwks.get(JWKS_CACHE_KEY).await {
                return Ok(cached);
            }
        }
        let fresh = Arc::new(self.provider.fetch_jwks().await?);
        self.jwks.insert(JWKS_CACHE_KEY, fresh.clone()).await;
        debug!("Cached {} signing keys", fresh.keys.len());
        Ok(fresh)
    }

    /// Decoding key for `kid`; an unknown kid refreshes the set once to pick
    /// up rotated keys.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey> {
        let mut set = self.key_set(false).await?;
        if set.find(kid).is_none() {
            set = self.key_set(true).await?;
        }
        let jwk = set
            .find(kid)
            .ok_or_else(|| AppError::Authentication("Unable to find appropriate key".into()))?;

        match (&jwk.n, &jwk.e) {
            (Some(n), Some(e)) => Ok(DecodingKey::from_rsa_components(n, e)?),
            _ => Err(AppError::Authentication(
                "Signing key is missing RSA components".into(),
            )),
        }
    }

    pub async fn validate(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Authentication("Token header has no kid".into()))?;
        let key = self.decoding_key(&kid).await?;
        let data = decode::<Claims>(token, &key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Resolves a bearer token to a stored user
pub struct AuthService {
    validator: TokenValidator,
    provider: Arc<dyn IdentityProvider>,
    graph: GraphClient,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: &AuthConfig, graph: GraphClient) -> Self {
        Self {
            validator: TokenValidator::new(provider.clone(), config),
            provider,
            graph,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims> {
        self.validator.validate(token).await
    }

    pub async fn fetch_profile(&self, token: &str) -> Result<IdentityProfile> {
        self.provider.fetch_profile(token).await
    }

    /// Validate, fetch the provider profile, then load or provision the user
    pub async fn current_user(&self, token: &str) -> Result<User> {
        let claims = self.validate_token(token).await?;
        let profile = self.fetch_profile(token).await?;
        if profile.sub != claims.sub {
            return Err(AppError::Authentication(
                "Profile subject does not match token".into(),
            ));
        }

        self.get_or_create_user(&profile).await.map_err(|e| match e {
            AppError::Database(_) | AppError::Decode(_) | AppError::Internal(_) => {
                AppError::NotFound(format!("Failed to get or create user: {}", e))
            }
            other => other,
        })
    }

    pub async fn get_or_create_user(&self, profile: &IdentityProfile) -> Result<User> {
        let existing = self
            .graph
            .fetch_optional::<User>(
                query("MATCH (u:User {auth_id: $auth_id}) RETURN u {.*} AS user")
                    .param("auth_id", profile.sub.as_str()),
                "user",
            )
            .await?;
        if let Some(user) = existing {
            return Ok(user);
        }

        let username = self.available_username(&profile.preferred_nickname()).await?;

        // MERGE keeps concurrent first logins from creating two users
        let q = query(
            "MERGE (u:User {auth_id: $auth_id})
             ON CREATE SET
                u.user_id = $user_id,
                u.username = $username,
                u.email = $email,
                u.display_name = $display_name,
                u.profile_picture_s3_key = $picture,
                u.is_private = false,
                u.created_at = $now,
                u.follower_count = 0,
                u.following_count = 0,
                u.likes_count = 0,
                u.post_count = 0,
                u.interests = []
             RETURN u {.*} AS user",
        )
        .param("auth_id", profile.sub.as_str())
        .param("user_id", Uuid::new_v4().to_string())
        .param("username", username.as_str())
        .param("email", profile.email.as_str())
        .param("display_name", profile.preferred_display_name())
        .param("picture", nullable(profile.picture.clone()))
        .param("now", db::now());

        let user: User = self.graph.fetch_one(q, "user", "user").await?;
        if user.username == username {
            USERS_PROVISIONED_TOTAL.inc();
            info!(user_id = %user.user_id, username = %user.username, "Provisioned new user");
        }
        Ok(user)
    }

    async fn available_username(&self, nickname: &str) -> Result<String> {
        let base = normalize_username_base(nickname);
        for attempt in 0..MAX_USERNAME_ATTEMPTS {
            let candidate = username_candidate(&base, attempt);
            let taken: Option<i64> = self
                .graph
                .fetch_optional(
                    query("MATCH (u:User {username: $username}) RETURN count(u) AS taken")
                        .param("username", candidate.as_str()),
                    "taken",
                )
                .await?;
            if taken.unwrap_or(0) == 0 {
                return Ok(candidate);
            }
        }
        warn!("Exhausted username candidates for base {}", base);
        Err(AppError::Internal("Could not allocate a username".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            domain: "tenant.example.com".into(),
            audience: "https://api.example.com".into(),
            jwks_cache_ttl_secs: 60,
        }
    }

    fn rsa_key(kid: &str) -> Jwk {
        Jwk {
            kty: "RSA".into(),
            kid: Some(kid.into()),
            use_: Some("sig".into()),
            alg: Some("RS256".into()),
            n: Some("sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw".into()),
            e: Some("AQAB".into()),
        }
    }

    #[test]
    fn test_jwk_set_lookup_by_kid() {
        let set = JwkSet {
            keys: vec![rsa_key("a"), rsa_key("b")],
        };
        assert!(set.find("b").is_some());
        assert!(set.find("c").is_none());
    }

    #[test]
    fn test_jwk_use_field_wire_name() {
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kty": "RSA", "kid": "k1", "use": "sig", "n": "abc", "e": "AQAB"
        }))
        .unwrap();
        assert_eq!(jwk.use_.as_deref(), Some("sig"));
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected_without_fetching_keys() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_fetch_jwks().never();
        let validator = TokenValidator::new(Arc::new(provider), &auth_config());

        let err = validator.validate("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_unknown_kid_refreshes_once_then_fails() {
        // header {"alg":"RS256","typ":"JWT","kid":"missing"}
        let header = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6Im1pc3NpbmcifQ";
        let token = format!("{}.e30.c2ln", header);

        let mut provider = MockIdentityProvider::new();
        provider.expect_fetch_jwks().times(2).returning(|| {
            Ok(JwkSet {
                keys: vec![rsa_key("present")],
            })
        });
        let validator = TokenValidator::new(Arc::new(provider), &auth_config());

        let err = validator.validate(&token).await.unwrap_err();
        assert!(
            matches!(err, AppError::Authentication(ref m) if m.contains("appropriate key")),
            "unexpected error: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_key_set_is_cached_between_validations() {
        let header = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6InByZXNlbnQifQ";
        let token = format!("{}.e30.c2ln", header);

        let mut provider = MockIdentityProvider::new();
        provider.expect_fetch_jwks().times(1).returning(|| {
            Ok(JwkSet {
                keys: vec![rsa_key("present")],
            })
        });
        let validator = TokenValidator::new(Arc::new(provider), &auth_config());

        // Signature check fails both times, but the key set is fetched once
        assert!(validator.validate(&token).await.is_err());
        assert!(validator.validate(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let header = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6InByZXNlbnQifQ";
        let token = format!("{}.e30.c2ln", header);

        let mut provider = MockIdentityProvider::new();
        provider
            .expect_fetch_jwks()
            .returning(|| Err(AppError::IdentityProvider("down".into())));
        let validator = TokenValidator::new(Arc::new(provider), &auth_config());

        let err = validator.validate(&token).await.unwrap_err();
        assert!(matches!(err, AppError::IdentityProvider(_)));
        assert_eq!(
            actix_web::ResponseError::status_code(&err),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_userinfo_failures_are_unauthorized() {
        for status in [
            reqwest::StatusCode::UNAUTHORIZED,
            reqwest::StatusCode::FORBIDDEN,
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            reqwest::StatusCode::BAD_GATEWAY,
        ] {
            let err = userinfo_rejection(status);
            assert!(matches!(err, AppError::Authentication(_)), "{status}");
            assert_eq!(
                actix_web::ResponseError::status_code(&err),
                actix_web::http::StatusCode::UNAUTHORIZED
            );
        }
    }
}
