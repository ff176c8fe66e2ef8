use std::path::PathBuf;

/// Result alias that carries the custom [`SoundjamError`] type.
pub type Result<T> = std::result::Result<T, SoundjamError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SoundjamError {
    /// Free-form failure surfaced to the command line as-is.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The sprite sheet image could not be opened or decoded.
    #[error("failed to load sprite sheet: {0}")]
    Image(#[from] image::ImageError),
    /// Configuration or output could not be (de)serialised.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// The sprite sheet dimensions do not describe at least one square frame.
    #[error("sprite sheet {path} is {width}x{height}, expected at least one square frame")]
    InvalidSprite {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// A colour string that none of the supported notations accept.
    #[error("invalid colour `{0}`")]
    InvalidColor(String),
    /// A dropped URI that does not name a local file.
    #[error("invalid file uri `{0}`")]
    InvalidUri(String),
}

impl SoundjamError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SoundjamError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SoundjamError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
