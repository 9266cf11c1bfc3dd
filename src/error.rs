//! Error types for Banter.
//!
//! All errors are categorized by domain. Each variant maps to a single HTTP
//! status code via [`IntoResponse`], so handlers can return `Result<T>` and
//! let the framework shape the failure body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for Banter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Banter.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    // ── Validation ────────────────────────────────────────────────────────
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// A user tried to friend themselves.
    #[error("Cannot send a friend request to yourself")]
    CannotAddSelf,

    // ── Auth ──────────────────────────────────────────────────────────────
    /// Login failed — wrong email or password. Deliberately does not say
    /// which, so the endpoint can't be used to probe for accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected route.
    #[error("Not authorized, no token")]
    MissingToken,

    /// The bearer token is malformed, tampered with, or expired.
    #[error("Not authorized, token failed")]
    InvalidToken,

    /// Caller has no rights over the target record.
    #[error("Not authorized")]
    Forbidden,

    // ── Users ─────────────────────────────────────────────────────────────
    /// Referenced user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Registration with an email that is already taken.
    #[error("User already exists with this email")]
    EmailTaken,

    /// Registration with a display name that is already taken.
    #[error("Username already exists")]
    NameTaken,

    // ── Friendship ────────────────────────────────────────────────────────
    /// No pending request with the given id in the caller's incoming list.
    #[error("Friend request not found")]
    RequestNotFound,

    /// A pending request already exists between the pair (either direction).
    #[error("Friend request already pending")]
    RequestPending,

    /// The pair is already friends.
    #[error("Already friends with this user")]
    AlreadyFriends,

    /// Unfriend target is not in the caller's friend list.
    #[error("Friend not found in your friends list")]
    NotFriends,

    // ── Messaging ─────────────────────────────────────────────────────────
    /// Referenced message does not exist.
    #[error("Message not found")]
    MessageNotFound,

    // ── Unexpected ────────────────────────────────────────────────────────
    /// Persistence or other unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::CannotAddSelf => StatusCode::BAD_REQUEST,
            // Duplicate-request conflicts surface as 400, matching the
            // taxonomy of the public API (bad input, not a server state).
            Error::RequestPending | Error::AlreadyFriends => StatusCode::BAD_REQUEST,
            Error::EmailTaken | Error::NameTaken => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::UserNotFound
            | Error::RequestNotFound
            | Error::NotFriends
            | Error::MessageNotFound => StatusCode::NOT_FOUND,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed unexpectedly");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
