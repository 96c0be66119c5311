use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskClientError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Error uploading file")]
    UploadFailed(#[source] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Plot decoding error: {0}")]
    PlotDecodeError(#[from] base64::DecodeError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Please select a file first")]
    NoFileSelected,

    #[error("Please upload a valid CSV file")]
    InvalidFileType { path: String },

    #[error("Missing health fields: {}", .missing.join(", "))]
    FormIncomplete { missing: Vec<String> },

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidFieldValue { field: String, value: String },

    #[error("Unknown health field: {field}")]
    UnknownField { field: String },

    #[error("{message}")]
    ApiStatus { status: u16, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Server,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl RiskClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoFileSelected
            | Self::InvalidFileType { .. }
            | Self::FormIncomplete { .. }
            | Self::InvalidFieldValue { .. }
            | Self::UnknownField { .. }
            | Self::CsvError(_) => ErrorCategory::Input,
            Self::RequestError(_) | Self::UploadFailed(_) => ErrorCategory::Network,
            Self::ApiStatus { .. } | Self::SerializationError(_) | Self::PlotDecodeError(_) => {
                ErrorCategory::Server
            }
            Self::ConfigError { .. } | Self::InvalidConfigValue { .. } | Self::TomlError(_) => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Server => match self {
                // 5xx 通常是服務端暫時性問題
                Self::ApiStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::RequestError(e) if e.is_timeout() => {
                "The analysis service did not answer in time".to_string()
            }
            Self::RequestError(e) if e.is_connect() => {
                "Could not reach the analysis service".to_string()
            }
            Self::RequestError(_) => "Error contacting the analysis service".to_string(),
            Self::SerializationError(_) => "The service returned an unexpected payload".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::NoFileSelected => "Pass the path of a CSV dataset",
            Self::InvalidFileType { .. } => "Use a file with the .csv extension",
            Self::FormIncomplete { .. } => "Provide all eight health metrics",
            Self::InvalidFieldValue { .. } => "Health metrics must be decimal numbers",
            Self::UnknownField { .. } => {
                "Valid fields: pregnancies, glucose, blood_pressure, skin_thickness, insulin, bmi, diabetes_pedigree, age"
            }
            Self::ApiStatus { status, .. } if *status >= 500 => {
                "Train the model with `analyze` before predicting, or check the service logs"
            }
            Self::ApiStatus { .. } => {
                "Check that the dataset has the required columns: Pregnancies, Glucose, BloodPressure, SkinThickness, Insulin, BMI, DiabetesPedigreeFunction, Age"
            }
            Self::RequestError(_) | Self::UploadFailed(_) => {
                "Check --api-url and that the service is running"
            }
            Self::SerializationError(_) | Self::PlotDecodeError(_) => {
                "Check that --api-url points at the diabetes analysis service"
            }
            Self::CsvError(_) => "Check that the file is comma separated with a header row",
            Self::ConfigError { .. } | Self::InvalidConfigValue { .. } | Self::TomlError(_) => {
                "Fix the configuration file or command line flags"
            }
            Self::IoError(_) | Self::ZipError(_) => "Check permissions on the output path",
        }
    }
}

pub type Result<T> = std::result::Result<T, RiskClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_high_severity() {
        let err = RiskClientError::InvalidFileType {
            path: "data.txt".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "Please upload a valid CSV file");
    }

    #[test]
    fn test_server_errors_by_status() {
        let bad_request = RiskClientError::ApiStatus {
            status: 400,
            message: "'Glucose' column missing".to_string(),
        };
        assert_eq!(bad_request.severity(), ErrorSeverity::High);
        assert_eq!(bad_request.to_string(), "'Glucose' column missing");

        let server_error = RiskClientError::ApiStatus {
            status: 500,
            message: "model not trained".to_string(),
        };
        assert_eq!(server_error.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_form_incomplete_lists_fields() {
        let err = RiskClientError::FormIncomplete {
            missing: vec!["bmi".to_string(), "age".to_string()],
        };
        assert_eq!(err.to_string(), "Missing health fields: bmi, age");
    }

    #[test]
    fn test_severity_levels() {
        assert!(ErrorSeverity::Medium < ErrorSeverity::High);
        assert!(ErrorSeverity::High < ErrorSeverity::Critical);

        let config = RiskClientError::ConfigError {
            message: "bad file".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::Critical);
    }
}
