use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudentVueError {
    #[error("Request to the portal failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("The portal session appears to have expired")]
    SessionExpired,

    #[error("Could not find {element} on the {page} page")]
    ElementNotFound { page: &'static str, element: String },

    #[error("Failed to parse the {page} page: {detail}")]
    ParsingError { page: &'static str, detail: String },

    #[error("Invalid district domain: {0:?}")]
    InvalidDomain(String),

    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Environment variable {0} is not set")]
    MissingEnvVar(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudentVueError {
    pub(crate) fn not_found(page: &'static str, element: impl Into<String>) -> Self {
        Self::ElementNotFound {
            page,
            element: element.into(),
        }
    }

    pub(crate) fn parsing(page: &'static str, detail: impl Into<String>) -> Self {
        Self::ParsingError {
            page,
            detail: detail.into(),
        }
    }

    /// True for rejected credentials, an unreachable login page or an expired session.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::SessionExpired)
    }

    /// True when the portal markup did not have the expected shape.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::ParsingError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StudentVueError>;
