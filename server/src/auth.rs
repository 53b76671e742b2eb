//! Identity verification for incoming connections.
//!
//! Tokens are HS256 JWTs as issued by the account service, carrying
//! `{userId, email, iat, exp}`. `JwtVerifier::issue` signs the same shape
//! for local tooling and tests.

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Name used when a token yields no display name.
pub const FALLBACK_DISPLAY_NAME: &str = "Player";

/// Verified identity behind a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no token presented")]
    MissingToken,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token could not be signed")]
    Signing,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            _ => AuthError::Malformed,
        }
    }
}

pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    iat: u64,
    /// Expiry, seconds since the Unix epoch
    exp: u64,
}

pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`.
    pub fn issue(&self, user_id: &str, email: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = get_current_timestamp();
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::Signing)
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        if claims.user_id.trim().is_empty() {
            return Err(AuthError::Malformed);
        }

        let display_name = display_name_from_email(&claims.email);
        Ok(Identity {
            user_id: claims.user_id,
            display_name,
        })
    }
}

/// Local part of the account email, or the fallback name.
fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or("").trim();
    if local.is_empty() {
        FALLBACK_DISPLAY_NAME.to_string()
    } else {
        local.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret-0123456789";
    const HOUR: Duration = Duration::from_secs(3600);

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(SECRET)
    }

    fn sign(claims: &serde_json::Value, secret: &[u8]) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let v = verifier();
        let token = v.issue("u-1", "ada@example.com", HOUR).unwrap();
        let identity = v.verify(&token).unwrap();
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.display_name, "ada");
    }

    #[test]
    fn account_service_token_verifies() {
        // Shape issued by the account service: userId and email, seven days.
        let now = get_current_timestamp();
        let token = sign(
            &json!({
                "userId": "64f0c2a9e1b2",
                "email": "grace@example.com",
                "iat": now,
                "exp": now + 7 * 24 * 3600,
            }),
            SECRET,
        );
        let identity = verifier().verify(&token).unwrap();
        assert_eq!(identity.user_id, "64f0c2a9e1b2");
        assert_eq!(identity.display_name, "grace");
    }

    #[test]
    fn bearer_style_whitespace_is_ignored() {
        let v = verifier();
        let token = v.issue("u-1", "ada@example.com", HOUR).unwrap();
        assert!(v.verify(&format!(" {token}\n")).is_ok());
    }

    #[test]
    fn empty_email_falls_back() {
        let v = verifier();
        let token = v.issue("u-2", "", HOUR).unwrap();
        assert_eq!(v.verify(&token).unwrap().display_name, FALLBACK_DISPLAY_NAME);
    }

    #[test]
    fn missing_user_id_rejected() {
        let now = get_current_timestamp();
        let token = sign(&json!({"email": "x@example.com", "exp": now + 60}), SECRET);
        assert_eq!(verifier().verify(&token), Err(AuthError::Malformed));

        let token = sign(&json!({"userId": " ", "exp": now + 60}), SECRET);
        assert_eq!(verifier().verify(&token), Err(AuthError::Malformed));
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let other = JwtVerifier::new(b"another-secret-987654");
        let token = other.issue("u-1", "ada@example.com", HOUR).unwrap();
        assert_eq!(verifier().verify(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn tampered_payload_rejected() {
        let v = verifier();
        let token = v.issue("u-1", "ada@example.com", HOUR).unwrap();
        let forged_claims = v.issue("admin", "root@example.com", HOUR).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged_claims.split('.').nth(1).unwrap();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(v.verify(&forged), Err(AuthError::BadSignature));
    }

    #[test]
    fn expired_token_rejected() {
        let now = get_current_timestamp();
        let token = sign(&json!({"userId": "u-1", "exp": now - 10}), SECRET);
        assert_eq!(verifier().verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn token_without_expiry_rejected() {
        let token = sign(&json!({"userId": "u-1"}), SECRET);
        assert_eq!(verifier().verify(&token), Err(AuthError::Malformed));
    }

    #[test]
    fn garbage_rejected() {
        let v = verifier();
        assert_eq!(v.verify(""), Err(AuthError::MissingToken));
        assert_eq!(v.verify("no-dot-here"), Err(AuthError::Malformed));
        assert_eq!(v.verify("abc.def.!!!"), Err(AuthError::Malformed));
    }
}
