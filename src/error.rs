use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use log::error;
use rocket::{
    http::Status,
    response::Responder,
    serde::json::{serde_json, Json},
    Request,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::election::ElectionError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Election(#[from] ElectionError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Election(err) => match err {
                ElectionError::Unauthorized(_) => Status::Forbidden,
                ElectionError::InvalidPhase { .. } | ElectionError::DuplicateVote => {
                    Status::Conflict
                }
                ElectionError::InvalidInput(_) => Status::BadRequest,
                ElectionError::InsufficientCandidates { .. } => Status::UnprocessableEntity,
                ElectionError::InvalidCandidate { .. } | ElectionError::NoVotesCast => {
                    Status::NotFound
                }
            },
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Argon2(_) | Self::Io(_) | Self::Json(_) => Status::InternalServerError,
            Self::Status(status, _) => *status,
        }
    }

    /// Machine-readable error kind included in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Election(err) => err.kind(),
            Self::Jwt(_) => "InvalidToken",
            Self::Argon2(_) | Self::Io(_) | Self::Json(_) => "Internal",
            Self::Status(..) => "Request",
        }
    }
}

/// JSON body sent alongside every error status.
#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.class().is_server_error() {
            error!("{self}");
        }
        // Hide the details of server-side failures from the client.
        let message = if status.class().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            kind: self.kind(),
            message,
        };
        (status, Json(body)).respond_to(req)
    }
}
