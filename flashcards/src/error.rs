use thiserror::Error;

/// Failure of a call against the Word Hero REST API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-zero `code`; `msg` is shown verbatim.
    #[error("{msg}")]
    Api { code: i64, msg: String },
    #[error("{0}")]
    Unauthorized(String),
    #[error("Please log in first")]
    MissingToken,
    #[error("Unexpected response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn api(code: i64, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let msg = if msg.trim().is_empty() {
            format!("Request failed (code {code})")
        } else {
            msg
        };
        Self::Api { code, msg }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.trim().is_empty() {
            Self::Unauthorized("Session expired, please log in again".to_owned())
        } else {
            Self::Unauthorized(msg)
        }
    }

    /// True when the error means the user has to (re)authenticate.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::MissingToken)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Local storage unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to write {key}: {cause}")]
    Write { key: String, cause: String },
    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Client-side validation of the account dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Username must be 3 to 50 characters")]
    Username,
    #[error("Password must be 6 to 100 characters")]
    Password,
    #[error("Please enter a valid email address")]
    Email,
    #[error("Passwords do not match")]
    Mismatch,
    #[error("{0} is required")]
    Required(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::Api(e) if e.needs_login())
    }
}
