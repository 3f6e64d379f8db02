//! Per integration point section state and the store owning the sections

use serde::{Deserialize, Serialize};

use super::ResponseCode;
use crate::error::{FlexError, FlexResult};
use crate::math::{Mat, Vec};
use crate::sections::SectionResponse;

/// Committed and trial state of one section integration point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSample {
    /// Response codes of the section at this point
    pub codes: std::vec::Vec<ResponseCode>,
    /// Location as a fraction of the element length
    pub location: f64,
    /// Integration weight as a fraction of the element length
    pub weight: f64,
    pub committed_deformation: Vec,
    pub trial_deformation: Vec,
    pub committed_resultant: Vec,
    pub trial_resultant: Vec,
    pub flexibility: Mat,
}

impl SectionSample {
    /// Create an unstressed sample
    pub fn new(codes: &[ResponseCode], location: f64, weight: f64, initial_flexibility: Mat) -> Self {
        let order = codes.len();
        Self {
            codes: codes.to_vec(),
            location,
            weight,
            committed_deformation: Vec::zeros(order),
            trial_deformation: Vec::zeros(order),
            committed_resultant: Vec::zeros(order),
            trial_resultant: Vec::zeros(order),
            flexibility: initial_flexibility,
        }
    }

    /// Number of response components
    pub fn order(&self) -> usize {
        self.codes.len()
    }

    /// Accept the trial values
    pub fn commit(&mut self) {
        self.committed_deformation.copy_from(&self.trial_deformation);
        self.committed_resultant.copy_from(&self.trial_resultant);
    }

    /// Return every value to the unstressed state
    pub fn reset(&mut self, initial_flexibility: Mat) {
        self.committed_deformation.fill(0.0);
        self.trial_deformation.fill(0.0);
        self.committed_resultant.fill(0.0);
        self.trial_resultant.fill(0.0);
        self.flexibility = initial_flexibility;
    }
}

/// Owner of the element's section response objects
///
/// Every operation addresses one section by index and touches no other.
#[derive(Debug, Clone)]
pub struct SectionStore {
    sections: std::vec::Vec<Box<dyn SectionResponse>>,
}

impl SectionStore {
    /// Take ownership of the given sections
    pub fn new(sections: std::vec::Vec<Box<dyn SectionResponse>>) -> Self {
        Self { sections }
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the store holds no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Response codes of section `i`
    pub fn codes(&self, i: usize) -> &[ResponseCode] {
        self.sections[i].response_codes()
    }

    /// Virgin flexibility of section `i`
    pub fn initial_flexibility(&self, i: usize) -> Mat {
        self.sections[i].initial_flexibility()
    }

    /// Push a trial deformation into section `i` and read back its
    /// resultant and flexibility
    pub fn set_trial_deformation(&mut self, i: usize, deformation: &Vec) -> FlexResult<(Vec, Mat)> {
        let section = &mut self.sections[i];
        section
            .set_trial_deformation(deformation)
            .map_err(|source| FlexError::Section { index: i, source })?;
        Ok((section.resultant(), section.flexibility()))
    }

    /// Commit section `i`
    pub fn commit(&mut self, i: usize) -> FlexResult<()> {
        self.sections[i]
            .commit_state()
            .map_err(|source| FlexError::Section { index: i, source })
    }

    /// Revert section `i` to its last committed state
    pub fn revert_to_last_commit(&mut self, i: usize) -> FlexResult<()> {
        self.sections[i]
            .revert_to_last_commit()
            .map_err(|source| FlexError::Section { index: i, source })
    }

    /// Revert section `i` to its virgin state
    pub fn revert_to_start(&mut self, i: usize) -> FlexResult<()> {
        self.sections[i]
            .revert_to_start()
            .map_err(|source| FlexError::Section { index: i, source })
    }
}
