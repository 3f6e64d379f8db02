//! Coordinate transformations between nodal and basic systems
//!
//! A transformation owns the element's nodal displacements, removes the
//! rigid-body motion, and hands the element its basic deformations. It
//! also maps basic forces and stiffness back to the nodal system.

mod linear;

pub use linear::LinearTransformation;

use std::fmt::Debug;

use crate::elements::ElementFamily;
use crate::error::FlexResult;
use crate::math::{Mat, Vec};

/// Geometry of a two-node frame element
pub trait CrdTransformation: Debug + Send {
    /// Element family this transformation serves
    fn family(&self) -> ElementFamily;

    /// Number of basic degrees of freedom
    fn nebd(&self) -> usize {
        self.family().nebd()
    }

    /// Number of nodal degrees of freedom of the element (both nodes)
    fn num_dofs(&self) -> usize {
        2 * self.family().dofs_per_node()
    }

    /// Undeformed element length
    fn initial_length(&self) -> f64;

    /// Set the trial nodal displacements
    fn update(&mut self, nodal: &Vec) -> FlexResult<()>;

    /// Basic deformations at the trial nodal displacements
    fn basic_trial_displacement(&self) -> Vec;

    /// Basic deformation change since the last commit
    fn basic_incremental_displacement(&self) -> Vec;

    /// Nodal forces from basic forces `q` and basic reaction offsets `p0`
    fn global_resisting_force(&self, q: &Vec, p0: &Vec) -> Vec;

    /// Nodal tangent stiffness from basic stiffness `kb` at basic forces `q`
    fn global_stiffness(&self, kb: &Mat, q: &Vec) -> Mat;

    /// Nodal stiffness from an initial basic stiffness
    fn initial_global_stiffness(&self, kb: &Mat) -> Mat;

    fn commit_state(&mut self);

    fn revert_to_last_commit(&mut self);

    fn revert_to_start(&mut self);

    /// Deep copy of this transformation, including its state
    fn box_clone(&self) -> Box<dyn CrdTransformation>;
}

impl Clone for Box<dyn CrdTransformation> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
