//! Error types.
//!
//! - `CheckError`: failures of the core (time conversion, model invocation, validation).
//! - `AppError`: what the `csc` binary reports, carrying a process exit code.

use thiserror::Error;

/// Opaque error raised by an external field model.
pub type ModelError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the core operations.
///
/// "No violation" is not an error; see `check::Outcome`.
#[derive(Debug, Error)]
pub enum CheckError {
    /// `(year, day_fraction)` does not name a day of that year.
    #[error("invalid date: year={year}, day_fraction={day_fraction}")]
    InvalidDate { year: i32, day_fraction: f64 },

    /// Two sequences that must be index-aligned have different lengths.
    #[error("length mismatch in {context}: expected {expected}, found {found}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// An external model call failed. The model's own error is kept as the source.
    #[error("{model} model call failed: {source}")]
    ModelInvocation {
        model: String,
        #[source]
        source: ModelError,
    },

    #[error("invalid tolerance {0}: must be finite and >= 0")]
    InvalidTolerance(f64),
}

impl CheckError {
    pub(crate) fn mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        CheckError::LengthMismatch {
            context,
            expected,
            found,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<CheckError> for AppError {
    fn from(err: CheckError) -> Self {
        let code = match &err {
            CheckError::InvalidDate { .. }
            | CheckError::LengthMismatch { .. }
            | CheckError::InvalidTolerance(_) => 2,
            CheckError::ModelInvocation { .. } => 4,
        };
        AppError::new(code, err.to_string())
    }
}
