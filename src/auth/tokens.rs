/**
 * JWT Token Pairs
 *
 * This module creates and verifies the access/refresh token pair used for
 * authentication.
 *
 * # Token Shape
 *
 * Both tokens are HS256 JWTs sharing one claims layout:
 *
 * - `sub` - username
 * - `kind` - `"access"` or `"refresh"`
 * - `exp` / `iat` - Unix timestamps
 *
 * Access tokens are short-lived (30 minutes by default) and authenticate
 * requests; refresh tokens are long-lived (7 days by default), persisted
 * server-side, and can only be exchanged for a new pair.
 */
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// Distinguishes access tokens from refresh tokens.
///
/// A refresh token must never be accepted where an access token is
/// expected (and vice versa), so the kind is part of the signed claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Token kind (access or refresh)
    pub kind: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the refresh token, persisted alongside it.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Sign a single token for `username` with the given kind and lifetime.
fn sign_token(
    jwt: &JwtConfig,
    username: &str,
    kind: TokenKind,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        kind,
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(jwt.secret.as_ref());
    encode(&Header::default(), &claims, &key)
}

/// Create a new access/refresh token pair for a user.
pub fn create_token_pair(
    jwt: &JwtConfig,
    username: &str,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    let access_ttl = Duration::minutes(jwt.access_ttl_minutes);
    let refresh_ttl = Duration::days(jwt.refresh_ttl_days);

    let access_token = sign_token(jwt, username, TokenKind::Access, access_ttl)?;
    let refresh_token = sign_token(jwt, username, TokenKind::Refresh, refresh_ttl)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        refresh_expires_at: Utc::now() + refresh_ttl,
    })
}

/// Verify a token's signature and expiry and decode its claims.
pub fn verify_token(
    jwt: &JwtConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(jwt.secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

/// Verify a token and require a specific kind.
///
/// Returns `None` for any failure: bad signature, expired, or wrong kind.
/// Callers map `None` to 401 (or a WebSocket policy-violation close).
pub fn verify_token_of_kind(jwt: &JwtConfig, token: &str, kind: TokenKind) -> Option<Claims> {
    match verify_token(jwt, token) {
        Ok(claims) if claims.kind == kind => Some(claims),
        Ok(claims) => {
            tracing::warn!(
                "token kind mismatch: expected {:?}, got {:?}",
                kind,
                claims.kind
            );
            None
        }
        Err(e) => {
            tracing::debug!("token verification failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
        }
    }

    #[test]
    fn test_pair_round_trip() {
        let jwt = test_config();
        let pair = create_token_pair(&jwt, "alice").unwrap();

        let access = verify_token(&jwt, &pair.access_token).unwrap();
        assert_eq!(access.sub, "alice");
        assert_eq!(access.kind, TokenKind::Access);

        let refresh = verify_token(&jwt, &pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, "alice");
        assert_eq!(refresh.kind, TokenKind::Refresh);

        // The refresh token outlives the access token
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_kind_is_enforced() {
        let jwt = test_config();
        let pair = create_token_pair(&jwt, "alice").unwrap();

        assert!(verify_token_of_kind(&jwt, &pair.access_token, TokenKind::Access).is_some());
        assert!(verify_token_of_kind(&jwt, &pair.refresh_token, TokenKind::Access).is_none());
        assert!(verify_token_of_kind(&jwt, &pair.access_token, TokenKind::Refresh).is_none());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let jwt = test_config();
        let pair = create_token_pair(&jwt, "alice").unwrap();

        let other = JwtConfig {
            secret: "some-other-secret".to_string(),
            ..jwt
        };
        assert!(verify_token(&other, &pair.access_token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let jwt = test_config();
        assert!(verify_token(&jwt, "not.a.token").is_err());
        assert!(verify_token_of_kind(&jwt, "", TokenKind::Access).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = test_config();
        // Signed well past the default validation leeway
        let token =
            sign_token(&jwt, "alice", TokenKind::Access, Duration::minutes(-10)).unwrap();
        assert!(verify_token(&jwt, &token).is_err());
    }
}
