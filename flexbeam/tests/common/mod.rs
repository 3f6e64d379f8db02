//! Synthetic sections and element builders shared by the integration tests

#![allow(dead_code)]

use flexbeam::math::{Mat, Vec};
use flexbeam::prelude::*;

pub const SHEAR_CODES: [ResponseCode; 3] = [ResponseCode::Axial, ResponseCode::MomentZ, ResponseCode::ShearY];

/// Linear section with constant flexibility that refuses any trial
/// deformation further than `max_step` from the last one it accepted
#[derive(Debug, Clone)]
pub struct ThresholdSection {
    codes: std::vec::Vec<ResponseCode>,
    flexibility: Mat,
    stiffness: Mat,
    max_step: f64,
    accepted: Vec,
    committed: Vec,
    pub rejections: usize,
}

impl ThresholdSection {
    pub fn new(codes: &[ResponseCode], flexibility: Mat, max_step: f64) -> Self {
        let n = codes.len();
        let stiffness = flexibility.clone().try_inverse().expect("invertible flexibility");
        Self {
            codes: codes.to_vec(),
            flexibility,
            stiffness,
            max_step,
            accepted: Vec::zeros(n),
            committed: Vec::zeros(n),
            rejections: 0,
        }
    }

    /// `diag(1, 1, 1)` flexibility with axial, moment and shear response
    pub fn unit(max_step: f64) -> Self {
        Self::new(&SHEAR_CODES, Mat::identity(3, 3), max_step)
    }
}

impl SectionResponse for ThresholdSection {
    fn response_codes(&self) -> &[ResponseCode] {
        &self.codes
    }

    fn initial_flexibility(&self) -> Mat {
        self.flexibility.clone()
    }

    fn set_trial_deformation(&mut self, deformation: &Vec) -> Result<(), SectionError> {
        let step = (deformation - &self.accepted).amax();
        if step > self.max_step {
            self.rejections += 1;
            return Err(SectionError::Rejected(format!(
                "step {} exceeds {}",
                step, self.max_step
            )));
        }
        self.accepted.copy_from(deformation);
        Ok(())
    }

    fn deformation(&self) -> Vec {
        self.accepted.clone()
    }

    fn resultant(&self) -> Vec {
        &self.stiffness * &self.accepted
    }

    fn flexibility(&self) -> Mat {
        self.flexibility.clone()
    }

    fn commit_state(&mut self) -> Result<(), SectionError> {
        self.committed.copy_from(&self.accepted);
        Ok(())
    }

    fn revert_to_last_commit(&mut self) -> Result<(), SectionError> {
        self.accepted.copy_from(&self.committed);
        Ok(())
    }

    fn revert_to_start(&mut self) -> Result<(), SectionError> {
        self.accepted.fill(0.0);
        self.committed.fill(0.0);
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SectionResponse> {
        Box::new(self.clone())
    }
}

/// Uncoupled stiffening section, `s = k e + c e³` per component
#[derive(Debug, Clone)]
pub struct CubicSection {
    codes: std::vec::Vec<ResponseCode>,
    k: std::vec::Vec<f64>,
    c: std::vec::Vec<f64>,
    trial: Vec,
}

impl CubicSection {
    pub fn new(codes: &[ResponseCode], k: &[f64], c: &[f64]) -> Self {
        Self {
            codes: codes.to_vec(),
            k: k.to_vec(),
            c: c.to_vec(),
            trial: Vec::zeros(codes.len()),
        }
    }

    fn tangent(&self, i: usize) -> f64 {
        self.k[i] + 3.0 * self.c[i] * self.trial[i].powi(2)
    }
}

impl SectionResponse for CubicSection {
    fn response_codes(&self) -> &[ResponseCode] {
        &self.codes
    }

    fn initial_flexibility(&self) -> Mat {
        Mat::from_diagonal(&Vec::from_iterator(self.k.len(), self.k.iter().map(|k| 1.0 / k)))
    }

    fn set_trial_deformation(&mut self, deformation: &Vec) -> Result<(), SectionError> {
        self.trial.copy_from(deformation);
        Ok(())
    }

    fn deformation(&self) -> Vec {
        self.trial.clone()
    }

    fn resultant(&self) -> Vec {
        Vec::from_iterator(
            self.k.len(),
            (0..self.k.len()).map(|i| self.k[i] * self.trial[i] + self.c[i] * self.trial[i].powi(3)),
        )
    }

    fn flexibility(&self) -> Mat {
        Mat::from_diagonal(&Vec::from_iterator(self.k.len(), (0..self.k.len()).map(|i| 1.0 / self.tangent(i))))
    }

    fn commit_state(&mut self) -> Result<(), SectionError> {
        Ok(())
    }

    fn revert_to_last_commit(&mut self) -> Result<(), SectionError> {
        Ok(())
    }

    fn revert_to_start(&mut self) -> Result<(), SectionError> {
        self.trial.fill(0.0);
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SectionResponse> {
        Box::new(self.clone())
    }
}

/// Delegates to the wrapped section but refuses every commit
#[derive(Debug, Clone)]
pub struct RefuseCommit<S>(pub S);

impl<S: SectionResponse + Clone + 'static> SectionResponse for RefuseCommit<S> {
    fn response_codes(&self) -> &[ResponseCode] {
        self.0.response_codes()
    }

    fn initial_flexibility(&self) -> Mat {
        self.0.initial_flexibility()
    }

    fn set_trial_deformation(&mut self, deformation: &Vec) -> Result<(), SectionError> {
        self.0.set_trial_deformation(deformation)
    }

    fn deformation(&self) -> Vec {
        self.0.deformation()
    }

    fn resultant(&self) -> Vec {
        self.0.resultant()
    }

    fn flexibility(&self) -> Mat {
        self.0.flexibility()
    }

    fn commit_state(&mut self) -> Result<(), SectionError> {
        Err(SectionError::CommitFailed("commits disabled".to_string()))
    }

    fn revert_to_last_commit(&mut self) -> Result<(), SectionError> {
        self.0.revert_to_last_commit()
    }

    fn revert_to_start(&mut self) -> Result<(), SectionError> {
        self.0.revert_to_start()
    }

    fn box_clone(&self) -> Box<dyn SectionResponse> {
        Box::new(self.clone())
    }
}

/// Horizontal planar element of length `length` starting at the origin
pub fn planar_element(
    length: f64,
    integration: impl BeamIntegration + 'static,
    sections: std::vec::Vec<Box<dyn SectionResponse>>,
    options: IterationOptions,
) -> FlexResult<ForceBeamColumn> {
    let transf = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(length, 0.0))?;
    ForceBeamColumn::new(1, Box::new(transf), Box::new(integration), sections, options)
}

/// `n` copies of `section`
pub fn repeat<S: SectionResponse + Clone + 'static>(section: S, n: usize) -> std::vec::Vec<Box<dyn SectionResponse>> {
    (0..n).map(|_| Box::new(section.clone()) as Box<dyn SectionResponse>).collect()
}

/// Planar nodal displacement vector with node j moved by `(ux, uy, rz)`
pub fn tip(ux: f64, uy: f64, rz: f64) -> Vec {
    Vec::from_vec(vec![0.0, 0.0, 0.0, ux, uy, rz])
}
