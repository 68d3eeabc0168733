//! Error types and handling for the `metbrief` crate

use thiserror::Error;

/// Main error type for the `metbrief` crate
#[derive(Error, Debug)]
pub enum MetbriefError {
    /// Raw report text could not be decoded at all
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Report retrieval errors
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MetbriefError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            MetbriefError::Decode { message } => {
                format!("Could not decode report: {message}")
            }
            MetbriefError::Fetch { .. } => {
                "Unable to retrieve weather reports. Please check your internet connection."
                    .to_string()
            }
            MetbriefError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            MetbriefError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let decode_err = MetbriefError::decode("no report time");
        assert!(matches!(decode_err, MetbriefError::Decode { .. }));

        let fetch_err = MetbriefError::fetch("connection failed");
        assert!(matches!(fetch_err, MetbriefError::Fetch { .. }));

        let validation_err = MetbriefError::validation("bad timezone");
        assert!(matches!(validation_err, MetbriefError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let decode_err = MetbriefError::decode("empty METAR");
        assert!(decode_err.user_message().contains("empty METAR"));

        let fetch_err = MetbriefError::fetch("test");
        assert!(fetch_err.user_message().contains("Unable to retrieve"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MetbriefError = io_err.into();
        assert!(matches!(err, MetbriefError::Io { .. }));
    }
}
