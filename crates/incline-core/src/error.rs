//! Error types for the inclinometer core

use thiserror::Error;

/// Errors raised by the filter, the simulator and the run loop
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InclineError {
    /// A call argument is out of its domain (e.g. `dt <= 0`, NaN rates).
    /// Nothing was mutated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The innovation covariance could not be inverted safely.
    /// Nothing was mutated.
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// A configuration value was rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, InclineError>;

/// Reject a value that must be strictly positive and finite
pub(crate) fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InclineError::InvalidConfig(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Reject a value that must be non-negative and finite
pub(crate) fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InclineError::InvalidConfig(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("q", 1e-8).is_ok());
        assert!(require_positive("q", 0.0).is_err());
        assert!(require_positive("q", -1.0).is_err());
        assert!(require_positive("q", f64::NAN).is_err());
        assert!(require_positive("q", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative("std", 0.0).is_ok());
        assert!(require_non_negative("std", -1e-12).is_err());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = require_positive("r_roll", 0.0).unwrap_err();
        assert!(err.to_string().contains("r_roll"));
    }
}
