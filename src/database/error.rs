use std::fmt::{self, Display};

use serde::Serialize;
use thiserror::Error as ThisError;
use warp::reject::Reject;

/// Operation failure carried through every fallible SDK call. Holds the HTTP
/// status the routing layer should answer with, plus a human-readable detail.
#[derive(Debug, Clone, Serialize)]
pub struct Error {
    pub code: u16,
    pub info: Option<String>,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.info {
            Some(info) => write!(f, "{} ({})", self.code, info),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for Error {}

impl Reject for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ApiError {
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid session")]
    InvalidSession,
    #[error("Not found")]
    NotFound,
    #[error("Conflict")]
    Conflict,
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    pub fn code(self) -> u16 {
        match self {
            ApiError::InvalidRequest => 400,
            ApiError::Unauthorized => 401,
            ApiError::InvalidSession => 403,
            ApiError::NotFound => 404,
            ApiError::Conflict => 409,
            ApiError::InternalServerError => 500,
        }
    }

    pub fn new(self, info: &str) -> Error {
        Error {
            code: self.code(),
            info: Some(info.to_string()),
        }
    }

    pub fn default(self) -> Error {
        Error {
            code: self.code(),
            info: Some(self.to_string()),
        }
    }
}

pub struct QueryError {
    info: String,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self { info }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Configuration(e) => Self::new(format!("{e}")),
            sqlx::Error::Database(e) => Self::new(format!("{e}")),
            sqlx::Error::Io(e) => Self::new(format!("{e}")),
            sqlx::Error::Tls(e) => Self::new(format!("{e}")),
            sqlx::Error::Protocol(e) => Self::new(format!("{e}")),
            sqlx::Error::RowNotFound => Self::new(format!("RowNotFound")),
            sqlx::Error::TypeNotFound { type_name } => {
                Self::new(format!("Type not found: {type_name}"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                Self::new(format!("Column index out of bounds {index} ({len})"))
            }
            sqlx::Error::ColumnNotFound(e) => Self::new(format!("{e}")),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::new(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::Decode(e) => Self::new(format!("{e}")),
            sqlx::Error::AnyDriverError(e) => Self::new(format!("{e}")),
            sqlx::Error::PoolTimedOut => Self::new(format!("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(format!("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(format!("Worker crashed")),
            sqlx::Error::Migrate(e) => Self::new(format!("{e}")),
            _ => Self::new(format!("Unknown error")),
        }
    }
}

impl Into<Error> for QueryError {
    fn into(self) -> Error {
        Error {
            code: 500,
            info: Some(self.info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_map_to_internal_failures() {
        let err: Error = QueryError::from(sqlx::Error::PoolClosed).into();
        assert_eq!(err.code, 500);
        assert_eq!(err.info.as_deref(), Some("Pool closed"));
    }

    #[test]
    fn api_error_codes() {
        assert_eq!(ApiError::Unauthorized.code(), 401);
        assert_eq!(ApiError::InvalidSession.code(), 403);
        assert_eq!(ApiError::NotFound.new("Recipe not found").code, 404);
        assert_eq!(
            ApiError::Conflict.default().info.as_deref(),
            Some("Conflict")
        );
    }
}
