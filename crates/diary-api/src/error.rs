use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use diary_types::api::ErrorResponse;
use diary_types::models::EntryType;

/// Coarse error classes; each maps to exactly one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotFound,
    MethodNotAllowed,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every failure a handler can produce. The `Display` text is what the
/// client sees in `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid query string")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Invalid request")]
    InvalidPath(#[from] PathRejection),

    #[error("Invalid request")]
    InvalidRequest,

    #[error("Email and password are required")]
    MissingCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("entryType is required")]
    MissingEntryType,

    #[error("entryType must be food, symptom, or exercise")]
    InvalidEntryType,

    #[error("{field} is required for {entry_type} entries")]
    MissingRequiredField {
        field: &'static str,
        entry_type: EntryType,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `message` goes to the client, `cause` only to the log.
    #[error("{message}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message,
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBody(_)
            | Self::InvalidQuery(_)
            | Self::InvalidPath(_)
            | Self::InvalidRequest
            | Self::MissingCredentials
            | Self::UserExists
            | Self::MissingEntryType
            | Self::InvalidEntryType
            | Self::MissingRequiredField { .. }
            | Self::InvalidDate(_) => ErrorKind::Validation,
            Self::AuthenticationRequired | Self::InvalidOrExpiredToken | Self::InvalidCredentials => {
                ErrorKind::Authentication
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MethodNotAllowed => ErrorKind::MethodNotAllowed,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal { message, cause } => error!("{}: {:#}", message, cause),
            Self::InvalidBody(rejection) => debug!("Rejected request body: {}", rejection.body_text()),
            Self::InvalidQuery(rejection) => debug!("Rejected query string: {}", rejection.body_text()),
            Self::InvalidPath(rejection) => debug!("Rejected path: {}", rejection.body_text()),
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_missing_field() {
        let err = ApiError::MissingRequiredField {
            field: "symptomType",
            entry_type: EntryType::Symptom,
        };
        assert_eq!(err.to_string(), "symptomType is required for symptom entries");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_hides_cause() {
        let err = ApiError::internal("Error fetching entries", anyhow::anyhow!("disk I/O error"));
        assert_eq!(err.to_string(), "Error fetching entries");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(ApiError::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidOrExpiredToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("Entry").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotFound("Entry").to_string(), "Entry not found");
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
