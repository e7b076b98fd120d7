use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Network error fetching {locator}: {reason}")]
    Network { locator: String, reason: String },

    #[error("Authorization failed for {locator} after credential refresh")]
    Auth { locator: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Attachment index {index} out of range (total: {total})")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("No delete handler supplied")]
    NoDeleteHandler,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

/// Coarse classification used for per-attachment error placeholders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    Decode,
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "File unavailable"),
            Self::Auth => write!(f, "File unavailable (not authorized)"),
            Self::Decode => write!(f, "Could not decode file"),
            Self::Other => write!(f, "Unexpected error"),
        }
    }
}

impl FolioError {
    pub fn network(locator: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Network {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Io(_) => ErrorKind::Network,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Decode(_) | Self::ImageError(_) => ErrorKind::Decode,
            Self::IndexOutOfRange { .. } | Self::Config(_) | Self::NoDeleteHandler => {
                ErrorKind::Other
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
