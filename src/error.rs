use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading tracks or rendering a chromosome.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Cannot draw track {track}: {reason}")]
    Draw { track: String, reason: String },

    #[error("Parsing error in {path}:{line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unsupported output format for {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl RenderError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn draw<S: Into<String>, R: Into<String>>(track: S, reason: R) -> Self {
        Self::Draw {
            track: track.into(),
            reason: reason.into(),
        }
    }

    pub fn parse<P: Into<PathBuf>, R: Into<String>>(path: P, line: usize, reason: R) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
