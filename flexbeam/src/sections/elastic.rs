//! Linear elastic section with uncoupled response components

use super::{check_order, Material, SectionProperties, SectionResponse};
use crate::elements::{ElementFamily, ResponseCode};
use crate::error::{FlexError, FlexResult, SectionError};
use crate::math::{Mat, Vec};

/// Linear elastic section, `s = diag(k) e`
#[derive(Debug, Clone)]
pub struct ElasticSection {
    codes: std::vec::Vec<ResponseCode>,
    stiffness: Vec,
    trial: Vec,
    committed: Vec,
}

impl ElasticSection {
    /// Create a section from response codes and one rigidity per code
    pub fn new(codes: &[ResponseCode], stiffness: &[f64]) -> FlexResult<Self> {
        if codes.len() != stiffness.len() {
            return Err(FlexError::DimensionMismatch {
                expected: codes.len(),
                found: stiffness.len(),
            });
        }
        if codes.is_empty() {
            return Err(FlexError::InvalidInput(
                "a section needs at least one response code".to_string(),
            ));
        }
        if let Some(k) = stiffness.iter().find(|k| !(**k > 0.0) || !k.is_finite()) {
            return Err(FlexError::InvalidInput(format!(
                "section rigidities must be positive, got {}",
                k
            )));
        }
        let n = codes.len();
        Ok(Self {
            codes: codes.to_vec(),
            stiffness: Vec::from_column_slice(stiffness),
            trial: Vec::zeros(n),
            committed: Vec::zeros(n),
        })
    }

    /// Planar section with axial and bending response (EA, EI)
    pub fn planar(ea: f64, ei: f64) -> FlexResult<Self> {
        Self::new(&[ResponseCode::Axial, ResponseCode::MomentZ], &[ea, ei])
    }

    /// Build a section covering every response code of `family`
    pub fn from_properties(
        material: &Material,
        properties: &SectionProperties,
        family: ElementFamily,
        include_shear: bool,
    ) -> FlexResult<Self> {
        let codes: std::vec::Vec<ResponseCode> = family
            .supported_codes()
            .iter()
            .copied()
            .filter(|c| include_shear || !matches!(c, ResponseCode::ShearY | ResponseCode::ShearZ))
            .collect();
        let stiffness = codes
            .iter()
            .map(|&c| {
                properties.rigidity(material, c).ok_or_else(|| {
                    FlexError::InvalidInput(format!("no rigidity for response code {:?}", c))
                })
            })
            .collect::<FlexResult<std::vec::Vec<f64>>>()?;
        Self::new(&codes, &stiffness)
    }

    /// Rigidity of each component
    pub fn stiffness(&self) -> &Vec {
        &self.stiffness
    }
}

impl SectionResponse for ElasticSection {
    fn response_codes(&self) -> &[ResponseCode] {
        &self.codes
    }

    fn initial_flexibility(&self) -> Mat {
        Mat::from_diagonal(&self.stiffness.map(|k| 1.0 / k))
    }

    fn set_trial_deformation(&mut self, deformation: &Vec) -> Result<(), SectionError> {
        check_order(self.codes.len(), deformation)?;
        self.trial.copy_from(deformation);
        Ok(())
    }

    fn deformation(&self) -> Vec {
        self.trial.clone()
    }

    fn resultant(&self) -> Vec {
        self.stiffness.component_mul(&self.trial)
    }

    fn flexibility(&self) -> Mat {
        self.initial_flexibility()
    }

    fn commit_state(&mut self) -> Result<(), SectionError> {
        self.committed.copy_from(&self.trial);
        Ok(())
    }

    fn revert_to_last_commit(&mut self) -> Result<(), SectionError> {
        self.trial.copy_from(&self.committed);
        Ok(())
    }

    fn revert_to_start(&mut self) -> Result<(), SectionError> {
        self.trial.fill(0.0);
        self.committed.fill(0.0);
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SectionResponse> {
        Box::new(self.clone())
    }
}
