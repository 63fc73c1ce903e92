use actix_web::{
    error::BlockingError,
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use database::{
    consts::consts::PersonId,
    database::{database::ApplyError, request_manager::RequestManagerError},
};
use thiserror::Error;

use crate::token::codec::InvalidToken;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("{0}")]
    InvalidToken(#[from] InvalidToken),

    #[error("Not found, record does not exist: {0}")]
    NotFound(PersonId),

    #[error("Database request failed: {0}")]
    Database(RequestManagerError),

    #[error("Database request could not be scheduled")]
    Blocking(#[from] BlockingError),

    /// Store failure while deleting, reported to the client instead of hidden behind a 500
    #[error("{0}")]
    DeleteFailed(String),
}

impl WebError {
    /// Store failures on the delete path become a 400 carrying the error message, a missing
    /// record stays a 404
    pub fn on_delete(self) -> Self {
        match self {
            WebError::Database(_) | WebError::Blocking(_) => {
                WebError::DeleteFailed(self.to_string())
            }
            err => err,
        }
    }
}

impl From<RequestManagerError> for WebError {
    fn from(err: RequestManagerError) -> Self {
        match err {
            RequestManagerError::Apply(ApplyError::NotFound(id)) => WebError::NotFound(id),
            err => WebError::Database(err),
        }
    }
}

impl ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::InvalidToken(_) | WebError::DeleteFailed(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Database(_) | WebError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            WebError::InvalidToken(_) | WebError::NotFound(_) => self.to_string(),
            WebError::DeleteFailed(_) => {
                log::error!("Delete failed: {}", self);

                self.to_string()
            }
            WebError::Database(_) | WebError::Blocking(_) => {
                log::error!("{}", self);

                "Internal Server Error".to_string()
            }
        };

        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(body)
    }
}
