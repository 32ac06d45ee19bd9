use std::convert::Infallible;

use serde::Serialize;
use warp::{http::StatusCode, reject::Rejection, reply, Filter, Reply};

use super::jwt::{verify_jwt_session, SessionData};
use crate::error::{ApiError, Error};

fn bearer_token(header: Option<String>) -> Option<String> {
    header.and_then(|value| value.strip_prefix("Bearer ").map(str::to_string))
}

/// Requires a valid session without extracting it. A missing token answers
/// 401, a bad or expired one 403.
pub fn with_auth() -> impl Filter<Extract = ((),), Error = Rejection> + Copy {
    warp::header::optional::<String>("authorization").and_then(
        |header: Option<String>| async move {
            match bearer_token(header) {
                None => Err(Rejection::from(ApiError::Unauthorized.new("Missing token"))),
                Some(token) => match verify_jwt_session(token) {
                    Ok(_) => Ok(()),
                    Err(e) => Err(Rejection::from(e)),
                },
            }
        },
    )
}

pub fn with_session() -> impl Filter<Extract = (SessionData,), Error = Rejection> + Copy {
    warp::header::optional::<String>("authorization").and_then(
        |header: Option<String>| async move {
            match bearer_token(header) {
                None => Err(Rejection::from(ApiError::Unauthorized.new("Missing token"))),
                Some(token) => match verify_jwt_session(token) {
                    Ok(data) => {
                        let session: SessionData = data.into();
                        Ok(session)
                    }
                    Err(e) => Err(Rejection::from(e)),
                },
            }
        },
    )
}

pub fn with_possible_session(
) -> impl Filter<Extract = (Option<SessionData>,), Error = Rejection> + Copy {
    warp::header::optional::<String>("authorization").map(
        |header: Option<String>| -> Option<SessionData> {
            bearer_token(header)
                .and_then(|token| verify_jwt_session(token).ok())
                .map(|claims| claims.into())
        },
    )
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Turns SDK rejections into the JSON error body clients expect.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if let Some(e) = err.find::<Error>() {
        (
            StatusCode::from_u16(e.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            e.info.clone().unwrap_or_else(|| String::from("Request failed")),
        )
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, String::from("Not found"))
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (StatusCode::BAD_REQUEST, String::from("Invalid request body"))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            String::from("Method not allowed"),
        )
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Internal server error"),
        )
    };

    Ok(reply::with_status(
        reply::json(&ErrorBody { error: message }),
        code,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::generate_jwt_session;
    use crate::schema::User;

    fn test_user() -> User {
        User {
            id: 1,
            name: String::from("Alice"),
            email: String::from("alice@example.com"),
            password: None,
            avatar_url: None,
            google_id: None,
        }
    }

    #[tokio::test]
    async fn session_filter_accepts_a_bearer_token() {
        let token = generate_jwt_session(&test_user());
        let session = warp::test::request()
            .header("authorization", format!("Bearer {token}"))
            .filter(&with_session())
            .await
            .unwrap();
        assert_eq!(session.user_id, 1);
        assert_eq!(session.email, "alice@example.com");
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let result = warp::test::request().filter(&with_session()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn mangled_token_is_rejected() {
        let result = warp::test::request()
            .header("authorization", "Bearer not-a-jwt")
            .filter(&with_auth())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn possible_session_defaults_to_none() {
        let session = warp::test::request()
            .filter(&with_possible_session())
            .await
            .unwrap();
        assert!(session.is_none());
    }
}
