//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Report generation error
    #[error("Report error: {message}")]
    Report {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reproducir library error
    #[error("Reproducir error: {0}")]
    Reproducir(#[from] reproducir::ReproducirError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = CliError::config("no manifest given");
        assert_eq!(err.to_string(), "Configuration error: no manifest given");
    }

    #[test]
    fn library_errors_convert() {
        let err: CliError = reproducir::ReproducirError::Manifest {
            path: "x.ini".to_string(),
            message: "no URLs found".to_string(),
        }
        .into();
        assert!(err.to_string().contains("x.ini"));
    }
}
