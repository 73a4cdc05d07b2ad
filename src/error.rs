use thiserror::Error;

pub const RATE_LIMIT_FALLBACK_MESSAGE: &str = "Too many requests";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("failed to write `{0}` to local storage")]
    WriteFailed(String),
    #[error("failed to remove `{0}` from local storage")]
    RemoveFailed(String),
}

/// Failures of a backend call, passed to callers uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("rate limit exceeded: {message}")]
    RateLimited { message: String },
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("request failed"))]
    Http { status: u16, message: Option<String> },
}

impl ApiError {
    /// The `message` field the backend attached to a rejected request, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::RateLimited { message } => Some(message),
            ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the sign-up / sign-in / OTP flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Credentials Required")]
    CredentialsRequired,
    #[error("Incomplete Protocol")]
    IncompleteForm,
    #[error("Code Mismatch")]
    PasswordMismatch,
    #[error("Incomplete Sequence")]
    IncompleteOtp,
    #[error("Session expired. Please restart protocol.")]
    EmailRequired,
    #[error("Security Token Missing")]
    MissingToken,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Api(err) => err
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| "Access Denied".to_string()),
            other => other.to_string(),
        }
    }
}
