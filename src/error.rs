//! Error types.
//!
//! Two layers:
//!
//! - [`ModelError`] / [`FitFailure`]: typed errors raised by the numeric core
//!   (fold assignment, fitting, cross-validation, grids).
//! - [`AppError`]: the binary-facing error carrying a process exit code.

use thiserror::Error;

/// Why a least-squares fit could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitFailure {
    /// Fewer training rows than free parameters.
    #[error("insufficient data: {observations} observations for {parameters} parameters")]
    InsufficientData { observations: usize, parameters: usize },

    /// Linearly dependent design columns (e.g. collinear coordinates in a fold).
    #[error("rank-deficient design matrix: rank {rank} < {parameters} parameters")]
    RankDeficient { rank: usize, parameters: usize },

    /// The solver produced non-finite coefficients.
    #[error("solver produced non-finite coefficients")]
    NonFinite,

    /// Every held-out prediction came out missing, so the fold has no score.
    #[error("no usable predictions for {held_out} held-out observations")]
    NoUsablePredictions { held_out: usize },
}

/// Errors raised by the modeling core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("fit failed for degree {degree}{}: {reason}", fold_suffix(.fold))]
    Fit {
        degree: u32,
        /// `None` for fits on the full dataset.
        fold: Option<usize>,
        reason: FitFailure,
    },
}

impl ModelError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ModelError::InvalidInput(message.into())
    }

    /// Attach a fold label to a fit failure (no-op for other variants).
    pub fn in_fold(self, label: usize) -> Self {
        match self {
            ModelError::Fit { degree, reason, .. } => ModelError::Fit {
                degree,
                fold: Some(label),
                reason,
            },
            other => other,
        }
    }
}

fn fold_suffix(fold: &Option<usize>) -> String {
    match fold {
        Some(label) => format!(" (fold {label})"),
        None => String::new(),
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

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let exit_code = match err {
            ModelError::InvalidInput(_) => 2,
            ModelError::Fit { .. } => 3,
        };
        AppError::new(exit_code, err.to_string())
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
