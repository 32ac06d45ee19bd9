use chrono::Utc;
use serde::Deserialize;

use crate::error::{ApiError, Error};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Claims of a Google ID token, as echoed back by the tokeninfo endpoint.
/// All values arrive as strings there, including the expiry timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub aud: String,
    pub exp: String,
}

/// Verifies a Google ID token against the tokeninfo endpoint and checks that
/// it was issued for this application and has not expired.
pub async fn verify_id_token(id_token: &str, client_id: &str) -> Result<GoogleClaims, Error> {
    let response = reqwest::Client::new()
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| {
            log::warn!("Google tokeninfo request failed: {e}");
            ApiError::Unauthorized.new("Google authentication failed")
        })?;

    if !response.status().is_success() {
        return Err(ApiError::Unauthorized.new("Google authentication failed"));
    }

    let claims: GoogleClaims = response
        .json()
        .await
        .map_err(|_| ApiError::Unauthorized.new("Invalid Google token"))?;

    validate_claims(&claims, client_id, Utc::now().timestamp())?;

    Ok(claims)
}

fn validate_claims(claims: &GoogleClaims, client_id: &str, now: i64) -> Result<(), Error> {
    if claims.aud != client_id {
        return Err(ApiError::Unauthorized.new("Invalid Google token"));
    }

    let exp = claims
        .exp
        .parse::<i64>()
        .map_err(|_| ApiError::Unauthorized.new("Invalid Google token"))?;
    if exp <= now {
        return Err(ApiError::Unauthorized.new("Google token expired"));
    }

    Ok(())
}
