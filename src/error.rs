//! Error types for the VR/VA benefit engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! [`EngineError`] covers run-level failures; row-level problems that only
//! skip a single employee are modelled separately as [`SkipReason`].

use thiserror::Error;

use crate::models::Diagnostic;

/// The main error type for the benefit engine.
///
/// Only a handful of conditions end a run unsuccessfully: configuration
/// problems, an empty eligible population, and a report that could not be
/// written. Everything else is accumulated as a diagnostic.
///
/// # Example
///
/// ```
/// use vr_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/settings.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/settings.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A named input could not be read.
    #[error("Source '{source_name}' unavailable: {message}")]
    SourceUnavailable {
        /// The logical name of the source.
        source_name: String,
        /// The underlying cause.
        message: String,
    },

    /// The eligibility filter produced nothing to process.
    #[error("No eligible employees found: {reason}")]
    NoEligibleEmployees {
        /// Why the eligible population is empty.
        reason: String,
        /// Diagnostics raised before the run stopped.
        diagnostics: Vec<Diagnostic>,
    },

    /// The payout report could not be persisted.
    #[error("Failed to write report '{path}': {message}")]
    ReportWriteError {
        /// The output path.
        path: String,
        /// A description of the write failure.
        message: String,
    },

    /// The document assistant failed or is not ready.
    #[error("Document assistant error: {message}")]
    AssistantError {
        /// A description of the failure.
        message: String,
    },

    /// A request to the engine was malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// A description of what was wrong.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a single employee row was left out of the payout batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The precomputed working-days cell held something other than a whole,
    /// non-negative number.
    #[error("invalid working days value '{value}'")]
    InvalidWorkingDays {
        /// The offending cell text.
        value: String,
    },

    /// The precomputed daily-rate cell held something other than a
    /// non-negative amount.
    #[error("invalid daily rate value '{value}'")]
    InvalidDailyRate {
        /// The offending cell text.
        value: String,
    },

    /// The computed amount does not fit the decimal range.
    #[error("amount overflow computing {working_days} x {daily_rate}")]
    AmountOverflow {
        /// Working days used in the product.
        working_days: u32,
        /// Daily rate used in the product.
        daily_rate: String,
    },

    /// Adding the row would push the batch totals out of the decimal range.
    #[error("amount {total} overflows the batch totals")]
    TotalsOverflow {
        /// The row's total.
        total: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/settings.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/settings.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_source_unavailable_displays_name_and_cause() {
        let error = EngineError::SourceUnavailable {
            source_name: "ativos".to_string(),
            message: "file not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Source 'ativos' unavailable: file not found"
        );
    }

    #[test]
    fn test_no_eligible_employees_displays_reason() {
        let error = EngineError::NoEligibleEmployees {
            reason: "active roster is empty".to_string(),
            diagnostics: Vec::new(),
        };
        assert_eq!(
            error.to_string(),
            "No eligible employees found: active roster is empty"
        );
    }

    #[test]
    fn test_report_write_error_displays_path() {
        let error = EngineError::ReportWriteError {
            path: "/out/report.xlsx".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to write report '/out/report.xlsx': permission denied"
        );
    }

    #[test]
    fn test_skip_reason_displays_value() {
        let reason = SkipReason::InvalidWorkingDays {
            value: "vinte".to_string(),
        };
        assert_eq!(reason.to_string(), "invalid working days value 'vinte'");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
        assert_error::<SkipReason>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_config_not_found() -> EngineResult<()> {
            Err(EngineError::ConfigNotFound {
                path: "/test".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_config_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
