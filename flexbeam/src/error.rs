//! Error types for flexbeam

use thiserror::Error;

/// Errors reported by a section response object
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionError {
    #[error("trial deformation rejected: {0}")]
    Rejected(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("expected a deformation vector of length {expected}, got {found}")]
    WrongOrder { expected: usize, found: usize },
}

/// Main error type for element state determination
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlexError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Singular element flexibility matrix")]
    SingularFlexibility,

    #[error("Failed to find a compatible element state after {subdivisions} subdivisions (|dW| = {energy:e})")]
    NonConvergence { subdivisions: usize, energy: f64 },

    #[error("Section {index}: {source}")]
    Section {
        index: usize,
        #[source]
        source: SectionError,
    },

    #[error("Dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FlexError {
    /// Whether the global solver may retry with a smaller step
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FlexError::NonConvergence { .. }
                | FlexError::SingularFlexibility
                | FlexError::Section { .. }
        )
    }
}

/// Result type for flexbeam operations
pub type FlexResult<T> = Result<T, FlexError>;
