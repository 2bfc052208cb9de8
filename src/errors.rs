use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Everything a submission can fail with. Client-fixable variants keep
/// their message; 500-class variants are logged and replaced with a
/// generic message before leaving the server.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("File validation failed: {}", .0.join(", "))]
    File(Vec<String>),
    #[error("An application with this email already exists")]
    DuplicateEmail,
    #[error("Malformed multipart payload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::File(_) | Error::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::Database(_) | Error::Migrate(_) | Error::Io(_) | Error::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn client_message(&self) -> String {
        if self.status().is_server_error() {
            "Registration failed due to a server error. Please try again later.".into()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }
        (
            status,
            Json(json!({
                "success": false,
                "message": self.client_message(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = Error::Validation(vec!["Email is required".into(), "Birthday is required".into()]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.client_message(),
            "Validation failed: Email is required, Birthday is required"
        );
    }

    #[test]
    fn duplicate_email_is_conflict() {
        assert_eq!(Error::DuplicateEmail.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn server_errors_are_masked() {
        let err = Error::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.client_message().contains("Pool"));
    }
}
