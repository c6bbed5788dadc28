use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use diary_types::api::Claims;
use diary_types::models::UserId;

/// How long an issued token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Signature or expiry check failed. Which one is deliberately not exposed.
#[derive(Debug, thiserror::Error)]
#[error("invalid or expired token")]
pub struct InvalidToken;

/// Issues and verifies HS256 bearer tokens carrying a user id.
///
/// The secret is fixed at construction; there is no server-side token store,
/// so a token stays valid until it expires.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::days(TOKEN_TTL_DAYS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: UserId) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<UserId, InvalidToken> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|_| InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_same_user() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue(42).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), 42);
    }

    #[test]
    fn payload_carries_user_id_and_seven_day_expiry() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue(9).unwrap();

        let data = decode::<Claims>(&token, &tokens.decoding, &tokens.validation).unwrap();
        assert_eq!(data.claims.user_id, 9);
        assert_eq!(data.claims.exp - data.claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn altered_signature_fails() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue(1).unwrap();

        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{}.{}{}", head, flipped, &sig[1..]);

        assert!(tokens.verify(&tampered).is_err());
    }

    #[test]
    fn other_secret_fails() {
        let issuer = TokenService::new("secret-one");
        let verifier = TokenService::new("secret-two");
        let token = issuer.issue(1).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn expired_token_fails() {
        let tokens = TokenService::with_ttl("test-secret", Duration::seconds(-5));
        let token = tokens.issue(1).unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn garbage_fails() {
        let tokens = TokenService::new("test-secret");
        assert!(tokens.verify("not-a-token").is_err());
        assert!(tokens.verify("").is_err());
    }
}
