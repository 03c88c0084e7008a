//! Error taxonomy for transports, the REST client and the session manager.
//!
//! ERROR HANDLING
//! ==============
//! `ApiError` describes one HTTP exchange. `SessionError` is what session
//! operations return to the view that started them. Storage corruption during
//! restore never reaches either; it is logged and degrades to signed out.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    /// HTTP status the server answered with.
    pub status: u16,
    /// Server-provided detail, suitable for display.
    pub message: String,
}

/// Failure of a single request to the screening API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// A bearer-authenticated request was answered with `401`.
    #[error("session expired; sign in again")]
    Unauthorized,
    /// Any other non-2xx answer.
    #[error("request failed ({status}): {message}")]
    Status { status: u16, message: String },
    /// Connection, timeout or browser fetch failure.
    #[error("network error: {0}")]
    Network(String),
    /// 2xx answer whose body does not match the expected schema.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Failure reading or writing durable session storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("session storage unavailable")]
    Unavailable,
    #[error("session storage write failed: {0}")]
    Write(String),
    #[error("session storage read failed: {0}")]
    Read(String),
}

/// Failure of a session operation (`establish`, `register_then_establish`, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Login or registration rejected by the server.
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid server response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
    /// A newer attempt, `clear` or `cancel_pending` superseded this one.
    #[error("sign-in attempt was cancelled")]
    Cancelled,
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::Auth(AuthError {
                status: 401,
                message: "Not authenticated".to_owned(),
            }),
            ApiError::Status { status, message } => Self::Auth(AuthError { status, message }),
            ApiError::Network(msg) => Self::Network(msg),
            ApiError::Decode(msg) => Self::InvalidResponse(msg),
        }
    }
}

impl SessionError {
    /// Message suitable for rendering next to a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => err.message.clone(),
            Self::Network(_) => "Could not reach the server. Try again.".to_owned(),
            Self::InvalidResponse(_) | Self::Storage(_) => "Something went wrong. Try again.".to_owned(),
            Self::Validation(msg) => msg.clone(),
            Self::Cancelled => "Sign-in cancelled.".to_owned(),
        }
    }
}
