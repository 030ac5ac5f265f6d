use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::ErrorResponse;
use thiserror::Error;
use tracing::error;

use crate::processor::SubmitError;
use crate::rate_limiter::RateLimited;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid ballot: {0}")]
    InvalidBallot(String),
    #[error("{0} has already voted")]
    AlreadyVoted(String),
    #[error("Results are locked until the ceremony")]
    ResultsLocked,
    #[error(transparent)]
    RateLimited(#[from] RateLimited),
    #[error("Storage error")]
    Storage(#[source] StoreError),
    #[error("Request could not be completed")]
    Worker(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => ApiError::InvalidBallot(msg),
            other => {
                error!("Store failure: {}", other);
                ApiError::Storage(other)
            }
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(v) => ApiError::InvalidBallot(v.to_string()),
            SubmitError::AlreadyVoted(voter) => ApiError::AlreadyVoted(voter),
            SubmitError::Store(s) => s.into(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidBallot(_) => Status::BadRequest,
            ApiError::AlreadyVoted(_) => Status::Forbidden,
            ApiError::ResultsLocked => Status::Forbidden,
            ApiError::RateLimited(_) => Status::TooManyRequests,
            ApiError::Storage(_) | ApiError::Worker(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        rocket::Response::build_from(Json(ErrorResponse::new(self.to_string())).respond_to(req)?)
            .status(status)
            .ok()
    }
}
