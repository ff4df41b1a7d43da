//! Error types for the WCS client.

use thiserror::Error;

use crate::bbox::BboxParseError;
use crate::time::TimeParseError;

/// Result type alias using WcsError.
pub type WcsResult<T> = Result<T, WcsError>;

/// Primary error type for WCS client operations.
#[derive(Debug, Error)]
pub enum WcsError {
    // === Document Errors ===
    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Invalid value in '{element}': {message}")]
    InvalidValue { element: String, message: String },

    #[error("XML error: {0}")]
    Xml(String),

    // === Lookup Errors ===
    #[error("No operation named {0}")]
    OperationNotFound(String),

    #[error("No content named {0}")]
    CoverageNotFound(String),

    #[error("Operation {operation} does not declare HTTP method {method}")]
    MethodNotDeclared { operation: String, method: String },

    // === Request Errors ===
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Exception report returned by the remote server.
    #[error("Service exception: {0}")]
    ServiceException(String),

    // === Transport Errors ===
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl WcsError {
    /// True for the lookup failures (operation, coverage, HTTP method).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WcsError::OperationNotFound(_)
                | WcsError::CoverageNotFound(_)
                | WcsError::MethodNotDeclared { .. }
        )
    }

    /// Get the OWS exception code for this error.
    pub fn ows_exception_code(&self) -> &'static str {
        match self {
            WcsError::MissingElement(_) | WcsError::PreconditionViolation(_) => {
                "MissingParameterValue"
            }
            WcsError::InvalidValue { .. } => "InvalidParameterValue",
            WcsError::OperationNotFound(_) | WcsError::MethodNotDeclared { .. } => {
                "OperationNotSupported"
            }
            WcsError::CoverageNotFound(_) => "CoverageNotDefined",
            _ => "NoApplicableCode",
        }
    }
}

impl From<std::io::Error> for WcsError {
    fn from(err: std::io::Error) -> Self {
        WcsError::Io(err.to_string())
    }
}

impl From<quick_xml::Error> for WcsError {
    fn from(err: quick_xml::Error) -> Self {
        WcsError::Xml(err.to_string())
    }
}

impl From<BboxParseError> for WcsError {
    fn from(err: BboxParseError) -> Self {
        WcsError::InvalidValue {
            element: "pos".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<TimeParseError> for WcsError {
    fn from(err: TimeParseError) -> Self {
        WcsError::InvalidValue {
            element: "timePosition".to_string(),
            message: err.to_string(),
        }
    }
}
