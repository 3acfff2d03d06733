/**
 * Server Configuration
 *
 * This module collects every runtime setting in one place, loaded from
 * environment variables (a `.env` file is honored by the binary entry
 * point before this runs).
 *
 * # Optional Services
 *
 * The database and object storage are both optional: when their settings
 * are missing the server still starts and the affected endpoints answer
 * 503 Service Unavailable. This mirrors how the server is run in local
 * development without docker-compose.
 */
use std::sync::Arc;

/// JWT signing settings and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days.
    pub refresh_ttl_days: i64,
}

/// Object storage (S3/MinIO) connection settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Endpoint URL, e.g. `http://localhost:9000` for a local MinIO.
    pub endpoint_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Base URL used when building public object links. Falls back to the
    /// endpoint URL when unset (inside docker the endpoint host is not
    /// reachable from a browser, so deployments override this).
    pub public_url: Option<String>,
    /// Signing region. S3-compatible stores accept any value here.
    pub region: String,
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL DSN. `None` disables database-backed endpoints.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Object storage settings. `None` disables media endpoints.
    pub storage: Option<StorageConfig>,
    /// HTTP listen port.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing optional settings disable the corresponding service rather
    /// than failing startup. The JWT secret has an insecure development
    /// default so a bare `cargo run` works out of the box.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").ok();

        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development default");
            "a_very_secret_key_for_local_development".to_string()
        });

        let access_ttl_minutes = env_parse("ACCESS_TOKEN_TTL_MINUTES", 30);
        let refresh_ttl_days = env_parse("REFRESH_TOKEN_TTL_DAYS", 7);

        let storage = load_storage_config();
        let port = env_parse("SERVER_PORT", 3000u16);

        Config {
            database_url,
            jwt: JwtConfig {
                secret,
                access_ttl_minutes,
                refresh_ttl_days,
            },
            storage,
            port,
        }
    }

    pub fn into_shared(self) -> Arc<Config> {
        Arc::new(self)
    }
}

/// Read the S3 settings, returning `None` unless every required variable
/// is present.
fn load_storage_config() -> Option<StorageConfig> {
    let endpoint_url = std::env::var("S3_ENDPOINT_URL").ok()?;
    let access_key = std::env::var("S3_ACCESS_KEY").ok()?;
    let secret_key = std::env::var("S3_SECRET_KEY").ok()?;
    let bucket = std::env::var("S3_BUCKET").ok()?;

    Some(StorageConfig {
        endpoint_url,
        access_key,
        secret_key,
        bucket,
        public_url: std::env::var("S3_PUBLIC_URL").ok(),
        region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
    })
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
        }
    }

    #[test]
    fn test_jwt_config_lifetimes() {
        let jwt = test_jwt_config();
        assert!(jwt.access_ttl_minutes < jwt.refresh_ttl_days * 24 * 60);
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        // Unset/garbage values fall back to the default
        assert_eq!(env_parse("BAZAAR_TEST_UNSET_VARIABLE", 42u16), 42);
    }
}
