//! Uncoupled bilinear section with kinematic hardening per component

use super::{check_order, SectionResponse};
use crate::elements::ResponseCode;
use crate::error::{FlexError, FlexResult, SectionError};
use crate::math::{Mat, Vec};

/// State of one component
#[derive(Debug, Clone, Copy, Default)]
struct ComponentState {
    plastic: f64,
    back: f64,
}

/// Parameters of one component
#[derive(Debug, Clone, Copy)]
struct Component {
    k: f64,
    yield_force: f64,
    hardening: f64,
}

impl Component {
    /// Return mapping; yields `(resultant, tangent, state)`
    fn evaluate(&self, e: f64, committed: &ComponentState) -> (f64, f64, ComponentState) {
        let trial = self.k * (e - committed.plastic);
        let xi = trial - committed.back;
        let f = xi.abs() - self.yield_force;
        if f <= 0.0 {
            return (trial, self.k, *committed);
        }
        let h = self.hardening;
        let dgamma = f / (self.k + h);
        let sign = xi.signum();
        let state = ComponentState {
            plastic: committed.plastic + dgamma * sign,
            back: committed.back + h * dgamma * sign,
        };
        (trial - self.k * dgamma * sign, self.k * h / (self.k + h), state)
    }
}

/// Section where each response component is an independent
/// elastic / linear-hardening spring
#[derive(Debug, Clone)]
pub struct BilinearSection {
    codes: std::vec::Vec<ResponseCode>,
    components: std::vec::Vec<Component>,
    committed: std::vec::Vec<ComponentState>,
    trial_state: std::vec::Vec<ComponentState>,
    trial: Vec,
    committed_deformation: Vec,
    resultant: Vec,
    tangent: Vec,
}

impl BilinearSection {
    /// Create an empty section; add components with [`with_component`](Self::with_component)
    pub fn new() -> Self {
        Self {
            codes: std::vec::Vec::new(),
            components: std::vec::Vec::new(),
            committed: std::vec::Vec::new(),
            trial_state: std::vec::Vec::new(),
            trial: Vec::zeros(0),
            committed_deformation: Vec::zeros(0),
            resultant: Vec::zeros(0),
            tangent: Vec::zeros(0),
        }
    }

    /// Add a component with elastic rigidity `k`, yield force `yield_force`
    /// and post-yield stiffness ratio `ratio` (0 < ratio < 1)
    pub fn with_component(
        mut self,
        code: ResponseCode,
        k: f64,
        yield_force: f64,
        ratio: f64,
    ) -> FlexResult<Self> {
        if !(k > 0.0) || !(yield_force > 0.0) {
            return Err(FlexError::InvalidInput(format!(
                "rigidity and yield force must be positive for {:?}",
                code
            )));
        }
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(FlexError::InvalidInput(format!(
                "hardening ratio must lie in (0, 1), got {}",
                ratio
            )));
        }
        self.codes.push(code);
        self.components.push(Component {
            k,
            yield_force,
            hardening: ratio * k / (1.0 - ratio),
        });
        self.committed.push(ComponentState::default());
        self.trial_state.push(ComponentState::default());
        let n = self.codes.len();
        self.trial = Vec::zeros(n);
        self.committed_deformation = Vec::zeros(n);
        self.resultant = Vec::zeros(n);
        self.tangent = Vec::from_iterator(n, self.components.iter().map(|c| c.k));
        Ok(self)
    }

    fn evaluate(&mut self) {
        for (i, c) in self.components.iter().enumerate() {
            let (s, k, state) = c.evaluate(self.trial[i], &self.committed[i]);
            self.resultant[i] = s;
            self.tangent[i] = k;
            self.trial_state[i] = state;
        }
    }
}

impl Default for BilinearSection {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionResponse for BilinearSection {
    fn response_codes(&self) -> &[ResponseCode] {
        &self.codes
    }

    fn initial_flexibility(&self) -> Mat {
        Mat::from_diagonal(&Vec::from_iterator(
            self.components.len(),
            self.components.iter().map(|c| 1.0 / c.k),
        ))
    }

    fn set_trial_deformation(&mut self, deformation: &Vec) -> Result<(), SectionError> {
        check_order(self.codes.len(), deformation)?;
        if deformation.iter().any(|v| !v.is_finite()) {
            return Err(SectionError::Rejected("non-finite deformation".to_string()));
        }
        self.trial.copy_from(deformation);
        self.evaluate();
        Ok(())
    }

    fn deformation(&self) -> Vec {
        self.trial.clone()
    }

    fn resultant(&self) -> Vec {
        self.resultant.clone()
    }

    fn flexibility(&self) -> Mat {
        Mat::from_diagonal(&self.tangent.map(|k| 1.0 / k))
    }

    fn commit_state(&mut self) -> Result<(), SectionError> {
        self.committed.copy_from_slice(&self.trial_state);
        self.committed_deformation.copy_from(&self.trial);
        Ok(())
    }

    fn revert_to_last_commit(&mut self) -> Result<(), SectionError> {
        self.trial.copy_from(&self.committed_deformation);
        self.evaluate();
        Ok(())
    }

    fn revert_to_start(&mut self) -> Result<(), SectionError> {
        self.committed.iter_mut().for_each(|s| *s = ComponentState::default());
        self.trial_state.iter_mut().for_each(|s| *s = ComponentState::default());
        self.trial.fill(0.0);
        self.committed_deformation.fill(0.0);
        self.evaluate();
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SectionResponse> {
        Box::new(self.clone())
    }
}
