use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("malformed loan record: missing {field}")]
    MalformedRecord {
        field: &'static str,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: Uuid,
    },

    #[error("loan already exists: {id}")]
    DuplicateLoan {
        id: Uuid,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoanError {
    pub(crate) fn invalid_terms(message: impl Into<String>) -> Self {
        LoanError::InvalidLoanTerms {
            message: message.into(),
        }
    }

    /// per-record failures that aggregation skips and counts instead of propagating
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            LoanError::InvalidLoanTerms { .. } | LoanError::MalformedRecord { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_level_classification() {
        assert!(LoanError::invalid_terms("term must be at least one month").is_record_level());
        assert!(LoanError::MalformedRecord { field: "startDate" }.is_record_level());
        assert!(!LoanError::InvalidDate {
            message: "2024-13-01".to_string()
        }
        .is_record_level());
    }

    #[test]
    fn test_error_messages() {
        let err = LoanError::MalformedRecord { field: "direction" };
        assert_eq!(err.to_string(), "malformed loan record: missing direction");

        let err = LoanError::invalid_terms("principal must be positive");
        assert_eq!(err.to_string(), "invalid loan terms: principal must be positive");
    }
}
