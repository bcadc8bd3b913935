use thiserror::Error;

pub const USAGE: &str = "Usage: geocode-etl <input_csv> <output_csv>\n\
Input CSV format: ID,Address\n\
Output CSV format: ID,Address,Latitude,Longitude";

/// Errors that abort the whole run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Invalid arguments: {message}")]
    Usage { message: String },

    #[error("Could not read input file at {path}: {source}")]
    InputRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file at {path} is not valid UTF-8")]
    InvalidEncoding { path: String },

    #[error("Input file is empty: {path}")]
    EmptyInput { path: String },

    #[error("Error writing output file {path}: {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("API client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Input,
    Output,
    Configuration,
    Network,
    Internal,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage { .. } => ErrorCategory::Usage,
            Self::InputRead { .. } | Self::InvalidEncoding { .. } | Self::EmptyInput { .. } => {
                ErrorCategory::Input
            }
            Self::OutputWrite { .. } => ErrorCategory::Output,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ApiError(_) => ErrorCategory::Network,
            Self::ProcessingError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Usage { .. } => USAGE.to_string(),
            Self::InputRead { path, .. } => format!("Error: Could not read input file at {}", path),
            Self::InvalidEncoding { path } => {
                format!("Error: Input file at {} is not valid UTF-8 text", path)
            }
            Self::EmptyInput { .. } => "Error: Input file is empty".to_string(),
            Self::OutputWrite { source, .. } => format!("Error writing output file: {}", source),
            other => format!("Error: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Usage => "Run with --help to see the expected arguments",
            ErrorCategory::Input => {
                "Check that the input file exists and contains ID,Address lines"
            }
            ErrorCategory::Output => {
                "Check that the output directory exists and is writable"
            }
            ErrorCategory::Configuration => "Fix the configuration value and try again",
            ErrorCategory::Network => "Check network connectivity and the geocoding endpoint",
            ErrorCategory::Internal => "Re-run with --verbose and report the log output",
        }
    }

    /// Every fatal error terminates the process with status 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Reasons a single address could not be geocoded. These never abort the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("Invalid URL for address: {address} ({reason})")]
    InvalidUrl { address: String, reason: String },

    #[error("Network error for '{address}': {message}")]
    Network { address: String, message: String },

    #[error("No data received for address: {address}")]
    EmptyBody { address: String },

    #[error("JSON parsing error for '{address}': {message}")]
    Parse { address: String, message: String },

    #[error("No location found for address: {address}")]
    NoLocation { address: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_exit_with_one() {
        let errors = vec![
            EtlError::EmptyInput {
                path: "in.csv".to_string(),
            },
            EtlError::OutputWrite {
                path: "out.csv".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            },
            EtlError::Usage {
                message: "missing output path".to_string(),
            },
        ];

        for e in errors {
            assert_eq!(e.exit_code(), 1);
        }
    }

    #[test]
    fn test_categories() {
        let e = EtlError::InvalidEncoding {
            path: "in.csv".to_string(),
        };
        assert_eq!(e.category(), ErrorCategory::Input);
        assert_eq!(
            e.user_friendly_message(),
            "Error: Input file at in.csv is not valid UTF-8 text"
        );

        let e = EtlError::Usage {
            message: "the following required arguments were not provided".to_string(),
        };
        assert_eq!(e.category(), ErrorCategory::Usage);
        assert!(e
            .user_friendly_message()
            .starts_with("Usage: geocode-etl <input_csv> <output_csv>"));
        assert_eq!(
            e.recovery_suggestion(),
            "Run with --help to see the expected arguments"
        );

        let e = EtlError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(e.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_geocode_error_messages_are_distinct() {
        let address = "1 Main St".to_string();
        let errors = [
            GeocodeError::InvalidUrl {
                address: address.clone(),
                reason: "relative URL without a base".to_string(),
            },
            GeocodeError::Network {
                address: address.clone(),
                message: "connection refused".to_string(),
            },
            GeocodeError::EmptyBody {
                address: address.clone(),
            },
            GeocodeError::Parse {
                address: address.clone(),
                message: "expected value".to_string(),
            },
            GeocodeError::NoLocation {
                address: address.clone(),
            },
        ];

        let messages: std::collections::HashSet<String> =
            errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), errors.len());
        assert!(messages.iter().all(|m| m.contains("1 Main St")));
    }
}
