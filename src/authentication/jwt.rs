use chrono::Duration;
use chrono::Local;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::constants::SESSION_LIFETIME_DAYS;
use crate::error::{ApiError, Error};
use crate::schema::{User, Uuid};

const FALLBACK_SECRET: &str = "change-me-to-a-random-string";

fn signing_key() -> Hmac<Sha256> {
    let secret =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| String::from(FALLBACK_SECRET));
    Hmac::new_from_slice(secret.as_bytes()).unwrap()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(user: &User) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + Duration::days(SESSION_LIFETIME_DAYS)).timestamp();

        Self {
            user_id: user.id,
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            iat,
            exp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Into<SessionData> for JwtSessionData {
    fn into(self) -> SessionData {
        SessionData {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
        }
    }
}

pub fn generate_jwt_session(user: &User) -> String {
    let claims = JwtSessionData::new(user);

    claims.sign_with_key(&signing_key()).unwrap()
}

pub fn verify_jwt_session(token: String) -> Result<JwtSessionData, Error> {
    token
        .verify_with_key(&signing_key())
        .map_err(|_| ApiError::InvalidSession.new("Invalid session; Invalid token"))
        .map(|session: JwtSessionData| {
            let now = Local::now().timestamp();

            if (session.exp - now).is_negative() {
                return Err(ApiError::InvalidSession.new("Invalid session; Token expired"));
            }
            return Ok(session);
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 7,
            name: String::from("Alice"),
            email: String::from("alice@example.com"),
            password: None,
            avatar_url: None,
            google_id: None,
        }
    }

    #[test]
    fn token_round_trips() {
        let token = generate_jwt_session(&test_user());
        let session = verify_jwt_session(token).unwrap();
        assert_eq!(session.user_id, 7);
        assert_eq!(session.name, "Alice");
        assert_eq!(session.email, "alice@example.com");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let mut token = generate_jwt_session(&test_user());
        token.push('x');
        let err = verify_jwt_session(token).unwrap_err();
        assert_eq!(err.code, 403);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Local::now().timestamp();
        let claims = serde_json::json!({
            "user_id": 7,
            "name": "Alice",
            "email": "alice@example.com",
            "iat": now - 120,
            "exp": now - 60,
        });
        let token = claims.sign_with_key(&signing_key()).unwrap();
        let err = verify_jwt_session(token).unwrap_err();
        assert_eq!(err.code, 403);
        assert_eq!(
            err.info.as_deref(),
            Some("Invalid session; Token expired")
        );
    }
}
