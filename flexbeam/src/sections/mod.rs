//! Cross-section constitutive response
//!
//! The element consumes sections only through [`SectionResponse`]. A
//! section maps a trial generalized strain (one entry per response code)
//! to a generalized stress resultant and a flexibility operator. Trial
//! deformations are always total values measured from the start of the
//! analysis; a section keeps whatever history it needs between commits.

mod bilinear;
mod elastic;
mod properties;

pub use bilinear::BilinearSection;
pub use elastic::ElasticSection;
pub use properties::{Material, SectionProperties};

use std::fmt::Debug;

use crate::elements::ResponseCode;
use crate::error::SectionError;
use crate::math::{Mat, Vec};

/// Pointwise constitutive behavior of a beam cross-section
pub trait SectionResponse: Debug + Send {
    /// Number of generalized response components
    fn order(&self) -> usize {
        self.response_codes().len()
    }

    /// Physical meaning of each component
    fn response_codes(&self) -> &[ResponseCode];

    /// Flexibility of the virgin section
    fn initial_flexibility(&self) -> Mat;

    /// Set the trial deformation and evaluate the response
    fn set_trial_deformation(&mut self, deformation: &Vec) -> Result<(), SectionError>;

    /// Trial deformation last accepted by `set_trial_deformation`
    fn deformation(&self) -> Vec;

    /// Stress resultant at the trial deformation
    fn resultant(&self) -> Vec;

    /// Flexibility at the trial deformation
    fn flexibility(&self) -> Mat;

    /// Accept the trial state as the new committed state
    fn commit_state(&mut self) -> Result<(), SectionError>;

    /// Discard the trial state
    fn revert_to_last_commit(&mut self) -> Result<(), SectionError>;

    /// Return to the virgin state
    fn revert_to_start(&mut self) -> Result<(), SectionError>;

    /// Deep copy of this section, including its state
    fn box_clone(&self) -> Box<dyn SectionResponse>;
}

impl Clone for Box<dyn SectionResponse> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Check a deformation vector against the section order
pub(crate) fn check_order(expected: usize, deformation: &Vec) -> Result<(), SectionError> {
    if deformation.len() != expected {
        return Err(SectionError::WrongOrder {
            expected,
            found: deformation.len(),
        });
    }
    Ok(())
}
