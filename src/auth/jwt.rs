use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::config::JwtConfig;

/// The only algorithms a session token may be signed with.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("unexpected signing algorithm")]
    WrongAlgorithm,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => Self::WrongAlgorithm,
            _ => Self::Malformed,
        }
    }
}

/// Issues and validates stateless HMAC-signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(cfg.secret.as_bytes(), Duration::hours(cfg.ttl_hours))
    }

    pub fn issue(&self, user_id: i64, now: OffsetDateTime) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id,
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Returns the subject of a token that verifies under our secret and has
    /// not reached its expiry at `now`.
    pub fn validate(&self, token: &str, now: OffsetDateTime) -> Result<i64, TokenError> {
        check_algorithm(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.set_required_spec_claims(&["exp"]);
        // expiry is checked below against the caller's clock, without leeway
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        if now.unix_timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        debug!(user_id = claims.sub, "jwt verified");
        Ok(claims.sub)
    }
}

fn check_algorithm(token: &str) -> Result<(), TokenError> {
    match decode_header(token) {
        Ok(header) if HMAC_ALGORITHMS.contains(&header.alg) => Ok(()),
        Ok(_) => Err(TokenError::WrongAlgorithm),
        // jsonwebtoken cannot even represent "none"; look at the raw header
        Err(_) => match declared_algorithm(token) {
            Some(alg) if !matches!(alg.as_str(), "HS256" | "HS384" | "HS512") => {
                Err(TokenError::WrongAlgorithm)
            }
            _ => Err(TokenError::Malformed),
        },
    }
}

fn declared_algorithm(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let raw = URL_SAFE_NO_PAD.decode(segment).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&raw).ok()?;
    header.get("alg")?.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    const T0: OffsetDateTime = datetime!(2025-01-01 12:00 UTC);

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret.as_bytes(), Duration::hours(72))
    }

    fn b64(value: serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn issued_token_validates_before_expiry() {
        let tokens = service("dev-secret");
        let token = tokens.issue(42, T0).expect("issue");
        assert_eq!(tokens.validate(&token, T0), Ok(42));
        assert_eq!(tokens.validate(&token, T0 + Duration::hours(71)), Ok(42));
    }

    #[test]
    fn token_expires_after_ttl() {
        let tokens = service("dev-secret");
        let token = tokens.issue(42, T0).expect("issue");
        assert_eq!(
            tokens.validate(&token, T0 + Duration::hours(73)),
            Err(TokenError::Expired)
        );
        // exactly at expiry is already too late
        assert_eq!(
            tokens.validate(&token, T0 + Duration::hours(72)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn different_secret_is_bad_signature() {
        let token = service("secret-1").issue(7, T0).expect("issue");
        assert_eq!(
            service("secret-2").validate(&token, T0),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn tampered_payload_is_bad_signature() {
        let tokens = service("dev-secret");
        let token = tokens.issue(7, T0).expect("issue");
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            b64(json!({ "sub": 1, "exp": T0.unix_timestamp() + 3600 })),
            parts[2]
        );
        assert_eq!(tokens.validate(&forged, T0), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = service("dev-secret");
        assert_eq!(tokens.validate("", T0), Err(TokenError::Malformed));
        assert_eq!(tokens.validate("not-a-jwt", T0), Err(TokenError::Malformed));
        assert_eq!(tokens.validate("a.b.c", T0), Err(TokenError::Malformed));
    }

    #[test]
    fn none_algorithm_is_rejected() {
        let token = format!(
            "{}.{}.",
            b64(json!({ "alg": "none", "typ": "JWT" })),
            b64(json!({ "sub": 1, "exp": T0.unix_timestamp() + 3600 }))
        );
        assert_eq!(
            service("dev-secret").validate(&token, T0),
            Err(TokenError::WrongAlgorithm)
        );
    }

    #[test]
    fn asymmetric_algorithm_is_rejected() {
        let token = format!(
            "{}.{}.{}",
            b64(json!({ "alg": "RS256", "typ": "JWT" })),
            b64(json!({ "sub": 1, "exp": T0.unix_timestamp() + 3600 })),
            URL_SAFE_NO_PAD.encode(b"signature")
        );
        assert_eq!(
            service("dev-secret").validate(&token, T0),
            Err(TokenError::WrongAlgorithm)
        );
    }

    #[test]
    fn other_hmac_variants_are_accepted() {
        let key = EncodingKey::from_secret(b"dev-secret");
        let claims = Claims {
            sub: 9,
            exp: T0.unix_timestamp() + 60,
        };
        let token = encode(&Header::new(Algorithm::HS512), &claims, &key).unwrap();
        assert_eq!(service("dev-secret").validate(&token, T0), Ok(9));
    }

    #[test]
    fn key_errors_are_not_algorithm_errors() {
        let err = jsonwebtoken::errors::Error::from(ErrorKind::InvalidKeyFormat);
        assert_eq!(TokenError::from(err), TokenError::Malformed);
        let err = jsonwebtoken::errors::Error::from(ErrorKind::InvalidAlgorithm);
        assert_eq!(TokenError::from(err), TokenError::WrongAlgorithm);
    }

    #[test]
    fn missing_or_unknown_claims_are_malformed() {
        let key = EncodingKey::from_secret(b"dev-secret");
        let header = Header::new(Algorithm::HS256);
        let tokens = service("dev-secret");

        let no_sub = encode(&header, &json!({ "exp": T0.unix_timestamp() + 60 }), &key).unwrap();
        assert_eq!(tokens.validate(&no_sub, T0), Err(TokenError::Malformed));

        let string_sub = encode(
            &header,
            &json!({ "sub": "1", "exp": T0.unix_timestamp() + 60 }),
            &key,
        )
        .unwrap();
        assert_eq!(tokens.validate(&string_sub, T0), Err(TokenError::Malformed));

        let extra = encode(
            &header,
            &json!({ "sub": 1, "exp": T0.unix_timestamp() + 60, "admin": true }),
            &key,
        )
        .unwrap();
        assert_eq!(tokens.validate(&extra, T0), Err(TokenError::Malformed));
    }
}
