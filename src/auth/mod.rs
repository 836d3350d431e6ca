use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::User;

pub mod password;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_ADMIN: &str = "admin";

/// OAuth `state` tokens only need to survive the round trip through GitHub.
const OAUTH_STATE_TTL_MINUTES: i64 = 10;
const OAUTH_STATE_PURPOSE: &str = "github_oauth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, email: String, name: String, role: String, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = expires_at(now, expiry_hours)?;

        Ok(Self {
            sub,
            email,
            name,
            role,
            exp,
            iat: now.timestamp(),
        })
    }

    pub fn for_user(user: &User) -> Result<Self, JwtError> {
        Self::new(
            user.id,
            user.email.clone(),
            user.name.clone(),
            user.role.clone(),
            config::config().security.jwt_expiry_hours,
        )
    }
}

/// Expiry timestamp `hours` after `now`, refusing values chrono cannot represent
fn expires_at(now: DateTime<Utc>, hours: u64) -> Result<i64, JwtError> {
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .map(|exp| exp.timestamp())
        .ok_or_else(|| JwtError::TokenGeneration(format!("token lifetime of {} hours is out of range", hours)))
}

/// Claims carried by the signed OAuth `state` parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub purpose: String,
    pub nonce: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    encode_with_secret(claims, &config::config().security.jwt_secret)
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    decode_with_secret(token, &config::config().security.jwt_secret)
}

pub fn generate_oauth_state() -> Result<String, JwtError> {
    let now = Utc::now();
    let claims = OAuthStateClaims {
        purpose: OAUTH_STATE_PURPOSE.to_string(),
        nonce: Uuid::new_v4(),
        exp: (now + Duration::minutes(OAUTH_STATE_TTL_MINUTES)).timestamp(),
        iat: now.timestamp(),
    };
    encode_with_secret(&claims, &config::config().security.jwt_secret)
}

pub fn validate_oauth_state(state: &str) -> Result<OAuthStateClaims, JwtError> {
    let claims: OAuthStateClaims = decode_with_secret(state, &config::config().security.jwt_secret)?;
    if claims.purpose != OAUTH_STATE_PURPOSE {
        return Err(JwtError::Invalid("state token has the wrong purpose".to_string()));
    }
    Ok(claims)
}

pub(crate) fn encode_with_secret<T: Serialize>(claims: &T, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub(crate) fn decode_with_secret<T: for<'de> Deserialize<'de>>(token: &str, secret: &str) -> Result<T, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<T>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn claims_expiring_in(seconds: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role: ROLE_STUDENT.to_string(),
            exp: now + seconds,
            iat: now,
        }
    }

    #[test]
    fn round_trips_claims() {
        let claims = claims_expiring_in(3600);
        let token = encode_with_secret(&claims, SECRET).unwrap();
        let decoded: Claims = decode_with_secret(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, "ada@example.com");
        assert_eq!(decoded.role, ROLE_STUDENT);
    }

    #[test]
    fn rejects_expired_token() {
        // Well past the default 60 second leeway
        let token = encode_with_secret(&claims_expiring_in(-3600), SECRET).unwrap();
        let err = decode_with_secret::<Claims>(&token, SECRET).unwrap_err();
        assert!(matches!(err, JwtError::Expired));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = encode_with_secret(&claims_expiring_in(3600), SECRET).unwrap();
        let err = decode_with_secret::<Claims>(&token, "another-secret").unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn rejects_garbage() {
        let err = decode_with_secret::<Claims>("not.a.jwt", SECRET).unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn empty_secret_is_refused() {
        let err = encode_with_secret(&claims_expiring_in(3600), "").unwrap_err();
        assert!(matches!(err, JwtError::InvalidSecret));
    }

    #[test]
    fn claims_carry_the_configured_lifetime() {
        let claims = Claims::new(Uuid::new_v4(), "ada@example.com".into(), "Ada".into(), ROLE_STUDENT.into(), 24).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_panic() {
        for hours in [u64::MAX, i64::MAX as u64, 1 << 40] {
            let err = Claims::new(Uuid::new_v4(), "ada@example.com".into(), "Ada".into(), ROLE_STUDENT.into(), hours)
                .unwrap_err();
            assert!(matches!(err, JwtError::TokenGeneration(_)), "hours = {}", hours);
        }
    }

    #[test]
    fn session_token_is_not_an_oauth_state() {
        let token = encode_with_secret(&claims_expiring_in(3600), SECRET).unwrap();
        assert!(decode_with_secret::<OAuthStateClaims>(&token, SECRET).is_err());
    }
}
