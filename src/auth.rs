use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified per the registered-claim convention.
    pub sub: String,
    pub username: String,
    pub exp: i64,
}

pub fn issue_token(user_id: i64, username: &str, config: &JwtConfig) -> Result<String, ApiError> {
    let expires_at = Utc::now() + Duration::hours(config.expires_in_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("failed to sign token")))
}

/// Decode and validate a bearer token. Any failure (bad signature, expired,
/// malformed subject) collapses into Unauthorized.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<(i64, String), ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    let user_id: i64 = data
        .claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized)?;

    Ok((user_id, data.claims.username))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expires_in_hours: 24,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let config = test_config();
        let token = issue_token(7, "john", &config).unwrap();
        let (user_id, username) = verify_token(&token, &config).unwrap();
        assert_eq!(user_id, 7);
        assert_eq!(username, "john");
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = issue_token(7, "john", &test_config()).unwrap();
        let other = JwtConfig {
            secret: "other-secret".to_string(),
            expires_in_hours: 24,
        };
        assert!(matches!(
            verify_token(&token, &other),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        assert!(matches!(
            verify_token("not-a-jwt", &test_config()),
            Err(ApiError::Unauthorized)
        ));
    }
}
