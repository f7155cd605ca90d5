use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by tokens from the identity provider. Only the fields the
/// backend reads are declared; anything else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // profile id
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::AuthError("Token subject is not a valid user id".to_string()))
    }

    /// Key used for the session cache and sign-out list. Tokens without a
    /// `session_id` fall back to subject plus issue time.
    pub fn session_key(&self) -> String {
        match &self.session_id {
            Some(id) => id.clone(),
            None => format!("{}:{}", self.sub, self.iat),
        }
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    leeway_secs: u64,
}

impl JwtService {
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway_secs,
        }
    }

    /// Issues a token the same shape as the identity provider's. The service
    /// itself never hands these out; local tooling and tests do.
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        session_id: Option<&str>,
        expires_in_secs: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            session_id: session_id.map(str::to_string),
            email: None,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        // provider tokens carry an `aud` we do not pin
        validation.validate_aud = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)?;
        claims.user_id()?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_session_id() {
        let jwt = JwtService::new("test-secret", 0);
        let user_id = Uuid::new_v4();
        let token = jwt.generate_access_token(user_id, Some("sess-1"), 60).unwrap();

        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.session_key(), "sess-1");
    }

    #[test]
    fn test_session_key_without_session_id() {
        let claims = Claims {
            sub: "abc".into(),
            exp: 10,
            iat: 5,
            session_id: None,
            email: None,
        };
        assert_eq!(claims.session_key(), "abc:5");
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        let issuer = JwtService::new("one", 0);
        let verifier = JwtService::new("two", 0);
        let token = issuer.generate_access_token(Uuid::new_v4(), None, 60).unwrap();
        assert!(verifier.verify_access_token(&token).is_err());

        let expired = issuer.generate_access_token(Uuid::new_v4(), None, -3600).unwrap();
        assert!(issuer.verify_access_token(&expired).is_err());
    }
}
