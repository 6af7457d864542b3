use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    /// Neo4j connection configuration, flattened from NEO4J_* env vars
    #[serde(flatten)]
    pub neo4j: Neo4jConfig,
    pub auth: AuthConfig,
    pub ranking: RankingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_env")]
    pub env: String,

    #[serde(default = "default_app_host")]
    pub host: String,

    #[serde(default = "default_app_port")]
    pub port: u16,

    /// Comma separated list; "*" allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    /// Neo4j bolt URI, e.g. bolt://neo4j:7687
    #[serde(rename = "NEO4J_URI", default = "default_neo4j_uri")]
    pub uri: String,
    #[serde(rename = "NEO4J_USER", default = "default_neo4j_user")]
    pub user: String,
    #[serde(rename = "NEO4J_PASSWORD", default = "default_neo4j_password")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Identity provider tenant, e.g. example.us.auth0.com
    pub domain: String,
    pub audience: String,
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain)
    }

    pub fn userinfo_url(&self) -> String {
        format!("https://{}/userinfo", self.domain)
    }
}

/// Loaded from RANKING_* / GDS_* variables via envy
#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    /// Upper bound on rows a ranking query pulls from the graph before scoring
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: i64,

    #[serde(default)]
    pub gds_refresh_on_startup: bool,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            gds_refresh_on_startup: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| default_app_env()),
            host: env::var("APP_HOST").unwrap_or_else(|_| default_app_host()),
            port: env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or_else(default_app_port),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| default_cors_origins()),
        };

        // NEO4J_* variables: fall back to defaults so the service can start
        // and report an unhealthy database instead of crash looping.
        let neo4j = Neo4jConfig {
            uri: env::var("NEO4J_URI").unwrap_or_else(|_| default_neo4j_uri()),
            user: env::var("NEO4J_USER").unwrap_or_else(|_| default_neo4j_user()),
            password: env::var("NEO4J_PASSWORD").unwrap_or_else(|_| default_neo4j_password()),
        };

        let auth = AuthConfig {
            domain: env::var("AUTH0_DOMAIN")
                .map_err(|_| anyhow::anyhow!("AUTH0_DOMAIN must be set"))?,
            audience: env::var("AUTH0_AUDIENCE")
                .map_err(|_| anyhow::anyhow!("AUTH0_AUDIENCE must be set"))?,
            jwks_cache_ttl_secs: env::var("JWKS_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or_else(default_jwks_cache_ttl),
        };

        let mut ranking: RankingSettings = envy::prefixed("RANKING_").from_env()?;
        if let Ok(flag) = env::var("GDS_REFRESH_ON_STARTUP") {
            ranking.gds_refresh_on_startup = matches!(flag.to_lowercase().as_str(), "1" | "true");
        }

        Ok(Self {
            app,
            neo4j,
            auth,
            ranking,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.app
            .cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8080
}

fn default_cors_origins() -> String {
    "*".to_string()
}

fn default_neo4j_uri() -> String {
    "bolt://neo4j:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "CHANGE_ME".to_string()
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

fn default_candidate_limit() -> i64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_app_env(), "development");
        assert_eq!(default_app_host(), "0.0.0.0");
        assert_eq!(default_app_port(), 8080);
        assert_eq!(default_neo4j_uri(), "bolt://neo4j:7687");
        assert_eq!(default_jwks_cache_ttl(), 3600);
        assert_eq!(RankingSettings::default().candidate_limit, 1000);
        assert!(!RankingSettings::default().gds_refresh_on_startup);
    }

    #[test]
    fn test_auth_urls() {
        let auth = AuthConfig {
            domain: "tenant.example.com".to_string(),
            audience: "https://api.example.com".to_string(),
            jwks_cache_ttl_secs: 60,
        };
        assert_eq!(auth.issuer(), "https://tenant.example.com/");
        assert_eq!(
            auth.jwks_url(),
            "https://tenant.example.com/.well-known/jwks.json"
        );
        assert_eq!(auth.userinfo_url(), "https://tenant.example.com/userinfo");
    }

    #[test]
    fn test_allowed_origins_split() {
        let config = Config {
            app: AppConfig {
                env: "production".to_string(),
                host: default_app_host(),
                port: 8080,
                cors_allowed_origins: "https://a.example, https://b.example,".to_string(),
            },
            neo4j: Neo4jConfig {
                uri: default_neo4j_uri(),
                user: default_neo4j_user(),
                password: default_neo4j_password(),
            },
            auth: AuthConfig {
                domain: "tenant.example.com".to_string(),
                audience: "aud".to_string(),
                jwks_cache_ttl_secs: 60,
            },
            ranking: RankingSettings::default(),
        };
        assert!(config.is_production());
        assert_eq!(
            config.allowed_origins(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
