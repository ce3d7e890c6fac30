use jsonwebtoken::errors::Error as JwtError;
use log::{debug, error};
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::{serde_json, Json},
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The caller does not hold the role the action needs.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Unknown contest or option.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The action is outside its legal time/state window.
    #[error("Phase error: {0}")]
    Phase(String),
    /// Duplicate registration, double vote, or re-ending a closed contest.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Corrupt audit log: {0}")]
    Corrupt(String),
    /// The server is misconfigured or cannot accept commits.
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// The kind of an [`Error`], as reported to callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    InvalidArgument,
    PhaseError,
    Conflict,
    Internal,
}

impl Error {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn phase(msg: impl Into<String>) -> Self {
        Self::Phase(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) | Self::Jwt(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Phase(_) => ErrorKind::PhaseError,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Corrupt(_) | Self::Internal(_) | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn status(&self) -> Status {
        match self.kind() {
            ErrorKind::Unauthorized => Status::Unauthorized,
            ErrorKind::NotFound => Status::NotFound,
            ErrorKind::InvalidArgument => Status::BadRequest,
            ErrorKind::PhaseError => Status::UnprocessableEntity,
            ErrorKind::Conflict => Status::Conflict,
            ErrorKind::Internal => Status::InternalServerError,
        }
    }
}

/// JSON body returned alongside every error status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.class() == StatusClass::ServerError {
            error!("{self}");
        } else {
            debug!("{self}");
        }
        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).respond_to(req)
    }
}
