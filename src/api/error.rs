use super::FieldErrors;
use crate::http_api::HttpJsonApiError;
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Session expired, please sign in again")]
    SignedOut,

    #[error("Request rejected: {0}")]
    Validation(FieldErrors),

    #[error("Not found")]
    NotFound,

    #[error("Permission denied")]
    Forbidden,

    #[error("Unexpected response status: {0}")]
    Status(StatusCode),

    #[error("Invalid response: {0}")]
    InvalidResponse(#[source] HttpJsonApiError),
}

impl From<HttpJsonApiError> for ApiError {
    fn from(value: HttpJsonApiError) -> Self {
        match value {
            HttpJsonApiError::UnsuccessfulResponse {
                status_code,
                message,
            } => match status_code {
                StatusCode::BAD_REQUEST => {
                    ApiError::Validation(FieldErrors::parse(message.as_deref()))
                }
                StatusCode::UNAUTHORIZED => ApiError::SignedOut,
                StatusCode::FORBIDDEN => ApiError::Forbidden,
                StatusCode::NOT_FOUND => ApiError::NotFound,
                code => ApiError::Status(code),
            },
            e => ApiError::InvalidResponse(e),
        }
    }
}
