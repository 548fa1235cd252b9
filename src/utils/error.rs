use thiserror::Error;

/// Failure while fetching or parsing the roster document.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Roster request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Roster request to {url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("Failed to read roster document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Roster document does not match the expected schema: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Load,
    Config,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RosterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RosterError::Load(_) => ErrorCategory::Load,
            RosterError::IoError(_) | RosterError::SerializationError(_) => ErrorCategory::Io,
            RosterError::ConfigError { .. }
            | RosterError::ConfigValidationError { .. }
            | RosterError::InvalidConfigValueError { .. }
            | RosterError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // the page still renders its error view with a retry control
            ErrorCategory::Load => ErrorSeverity::Medium,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RosterError::Load(LoadError::Status { status, .. }) => {
                format!("The roster document could not be downloaded (HTTP {})", status)
            }
            RosterError::Load(LoadError::Parse(_)) => {
                "The roster document is not valid roster JSON".to_string()
            }
            RosterError::Load(_) => "The roster document could not be loaded".to_string(),
            RosterError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            RosterError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration value for {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Load => {
                "Check that the site URL or site root points at a directory containing the data file, then retry"
            }
            ErrorCategory::Config => "Fix the configuration value and run again",
            ErrorCategory::Io => "Check that the output directory is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_are_medium_severity() {
        let err = RosterError::from(LoadError::Status {
            status: 404,
            url: "http://localhost/data/students.json".to_string(),
        });
        assert_eq!(err.category(), ErrorCategory::Load);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_friendly_message().contains("404"));
    }

    #[test]
    fn config_errors_exit_with_one() {
        let err = RosterError::MissingConfigError {
            field: "source.data_path".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.exit_code(), 1);
    }
}
