//! Iteration strategy and options for element state determination

pub mod compatibility;

use serde::{Deserialize, Serialize};

use crate::error::{FlexError, FlexResult};

pub use compatibility::{CompatibilityIterator, IterationReport};

/// Section flexibility used to turn a section force unbalance into a
/// deformation increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IterationMode {
    /// Current section flexibility on every pass
    Newton,
    /// Initial section flexibility on the first pass, current afterwards
    InitialThenNewton,
    /// Initial section flexibility on every pass
    InitialTangent,
}

impl IterationMode {
    /// Modes in the order they are attempted for one sub-increment
    pub const SEQUENCE: [IterationMode; 3] = [
        IterationMode::Newton,
        IterationMode::InitialThenNewton,
        IterationMode::InitialTangent,
    ];

    /// Whether pass `pass` (zero based) uses the initial section flexibility
    pub fn uses_initial_flexibility(&self, pass: usize) -> bool {
        match self {
            IterationMode::Newton => false,
            IterationMode::InitialThenNewton => pass == 0,
            IterationMode::InitialTangent => true,
        }
    }
}

impl Default for IterationMode {
    fn default() -> Self {
        Self::Newton
    }
}

/// Options for the element compatibility iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationOptions {
    /// Convergence tolerance on the energy norm |dW|
    pub tolerance: f64,
    /// Pass budget for the Newton and initial-tangent modes
    pub max_iterations: usize,
    /// Budget multiplier for the initial-then-Newton mode
    pub initial_tangent_factor: usize,
    /// Divisor applied to the trial increment after all modes fail
    pub subdivision_factor: f64,
    /// Maximum subdivision level (1 disables subdivision)
    pub max_subdivisions: usize,
}

impl Default for IterationOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 10,
            initial_tangent_factor: 10,
            subdivision_factor: 2.0,
            max_subdivisions: 10,
        }
    }
}

impl IterationOptions {
    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set the pass budget per mode
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set the budget multiplier of the initial-then-Newton mode
    pub fn with_initial_tangent_factor(mut self, factor: usize) -> Self {
        self.initial_tangent_factor = factor;
        self
    }

    /// Set the subdivision factor
    pub fn with_subdivision_factor(mut self, factor: f64) -> Self {
        self.subdivision_factor = factor;
        self
    }

    /// Set the maximum subdivision level
    pub fn with_max_subdivisions(mut self, max_subdivisions: usize) -> Self {
        self.max_subdivisions = max_subdivisions;
        self
    }

    /// Pass budget for a given mode
    pub fn budget(&self, mode: IterationMode) -> usize {
        match mode {
            IterationMode::InitialThenNewton => self.max_iterations * self.initial_tangent_factor,
            _ => self.max_iterations,
        }
    }

    /// Check the options are usable
    pub fn validate(&self) -> FlexResult<()> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(FlexError::InvalidInput(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(FlexError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.initial_tangent_factor == 0 {
            return Err(FlexError::InvalidInput(
                "initial_tangent_factor must be at least 1".to_string(),
            ));
        }
        if !(self.subdivision_factor > 1.0) || !self.subdivision_factor.is_finite() {
            return Err(FlexError::InvalidInput(format!(
                "subdivision_factor must be greater than 1, got {}",
                self.subdivision_factor
            )));
        }
        if self.max_subdivisions == 0 {
            return Err(FlexError::InvalidInput(
                "max_subdivisions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
