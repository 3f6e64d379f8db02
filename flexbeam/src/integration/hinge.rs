//! Plastic-hinge integration with a closed-form elastic interior

use serde::{Deserialize, Serialize};

use super::{BeamIntegration, Legendre};
use crate::elements::{ElementFamily, ResponseCode};
use crate::error::{FlexError, FlexResult};
use crate::loads::ElementLoad;
use crate::math::{Mat, Vec};

/// Gauss points per sub-interval when integrating load deformations
const INTERIOR_POINTS: usize = 4;

/// Rigidities of the elastic region between the hinges
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ElasticInterior {
    pub ea: f64,
    pub eiz: f64,
    /// Only used by spatial elements
    pub eiy: f64,
    /// Only used by spatial elements
    pub gj: f64,
}

impl ElasticInterior {
    /// Interior for planar elements
    pub fn planar(ea: f64, eiz: f64) -> Self {
        Self {
            ea,
            eiz,
            eiy: f64::INFINITY,
            gj: f64::INFINITY,
        }
    }

    fn codes(family: ElementFamily) -> &'static [ResponseCode] {
        match family {
            ElementFamily::Planar => &[ResponseCode::Axial, ResponseCode::MomentZ],
            ElementFamily::Spatial => &[
                ResponseCode::Axial,
                ResponseCode::MomentZ,
                ResponseCode::MomentY,
                ResponseCode::Torque,
            ],
        }
    }

    fn flexibility(&self, code: ResponseCode) -> f64 {
        match code {
            ResponseCode::Axial => 1.0 / self.ea,
            ResponseCode::MomentZ => 1.0 / self.eiz,
            ResponseCode::MomentY => 1.0 / self.eiy,
            ResponseCode::Torque => 1.0 / self.gj,
            _ => 0.0,
        }
    }
}

/// Two hinge sections at the midpoints of their plastic hinge lengths,
/// with an Euler-Bernoulli elastic interior integrated exactly
///
/// The element must carry exactly two sections: the first at node i, the
/// second at node j.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HingeMidpoint {
    pub lp_i: f64,
    pub lp_j: f64,
    pub interior: ElasticInterior,
}

impl HingeMidpoint {
    /// Create a scheme with hinge lengths `lp_i`, `lp_j`
    pub fn new(lp_i: f64, lp_j: f64, interior: ElasticInterior) -> FlexResult<Self> {
        if !(lp_i > 0.0) || !(lp_j > 0.0) {
            return Err(FlexError::Configuration(
                "plastic hinge lengths must be positive".to_string(),
            ));
        }
        let rigidities = [interior.ea, interior.eiz, interior.eiy, interior.gj];
        if rigidities.iter().any(|k| !(*k > 0.0)) {
            return Err(FlexError::Configuration(
                "elastic interior rigidities must be positive".to_string(),
            ));
        }
        Ok(Self { lp_i, lp_j, interior })
    }

    /// Interior bounds `(alpha, beta)` as fractions of the length
    fn bounds(&self, length: f64) -> (f64, f64) {
        (self.lp_i / length, 1.0 - self.lp_j / length)
    }
}

impl BeamIntegration for HingeMidpoint {
    fn name(&self) -> &'static str {
        "HingeMidpoint"
    }

    fn check_sections(&self, n: usize) -> FlexResult<()> {
        if n != 2 {
            return Err(FlexError::Configuration(format!(
                "HingeMidpoint integration needs exactly two sections, got {}",
                n
            )));
        }
        Ok(())
    }

    fn check_length(&self, length: f64) -> FlexResult<()> {
        if self.lp_i + self.lp_j > length {
            return Err(FlexError::Configuration(format!(
                "hinge lengths {} + {} exceed the element length {}",
                self.lp_i, self.lp_j, length
            )));
        }
        Ok(())
    }

    fn section_locations(&self, _n: usize, length: f64) -> FlexResult<std::vec::Vec<f64>> {
        self.check_length(length)?;
        Ok(vec![0.5 * self.lp_i / length, 1.0 - 0.5 * self.lp_j / length])
    }

    fn section_weights(&self, _n: usize, length: f64) -> FlexResult<std::vec::Vec<f64>> {
        self.check_length(length)?;
        Ok(vec![self.lp_i / length, self.lp_j / length])
    }

    fn elastic_fraction(&self, length: f64) -> f64 {
        let (alpha, beta) = self.bounds(length);
        (beta - alpha).max(0.0)
    }

    fn add_elastic_flexibility(&self, family: ElementFamily, length: f64, f: &mut Mat) {
        let (alpha, beta) = self.bounds(length);
        if beta <= alpha {
            return;
        }
        let l = length;
        let cubes = (beta.powi(3) - alpha.powi(3)) / 3.0;
        let squares = (beta.powi(2) - alpha.powi(2)) / 2.0;
        let ii = ((beta - 1.0).powi(3) - (alpha - 1.0).powi(3)) / 3.0;
        let ij = cubes - squares;

        f[(0, 0)] += l * (beta - alpha) / self.interior.ea;

        let mut bending = |a: usize, b: usize, ei: f64| {
            f[(a, a)] += l * ii / ei;
            f[(b, b)] += l * cubes / ei;
            f[(a, b)] += l * ij / ei;
            f[(b, a)] += l * ij / ei;
        };
        bending(1, 2, self.interior.eiz);
        if family == ElementFamily::Spatial {
            bending(3, 4, self.interior.eiy);
            f[(5, 5)] += l * (beta - alpha) / self.interior.gj;
        }
    }

    fn add_elastic_deformations(
        &self,
        family: ElementFamily,
        load: &ElementLoad,
        factor: f64,
        length: f64,
        v0: &mut Vec,
    ) -> FlexResult<()> {
        let (alpha, beta) = self.bounds(length);
        if beta <= alpha {
            return Ok(());
        }
        let codes = ElasticInterior::codes(family);
        let fe = Mat::from_diagonal(&Vec::from_iterator(
            codes.len(),
            codes.iter().map(|&c| self.interior.flexibility(c)),
        ));

        let mut breaks = vec![alpha];
        if let Some(k) = load.kink().filter(|k| *k > alpha && *k < beta) {
            breaks.push(k);
        }
        breaks.push(beta);

        let (points, weights) = Legendre::rule(INTERIOR_POINTS)?;
        for span in breaks.windows(2) {
            let (a, b) = (span[0], span[1]);
            for (x, w) in points.iter().zip(&weights) {
                let xi = a + (b - a) * x;
                let bx = family.force_interpolation(codes, xi, length);
                let sp = load.section_forces(family, codes, xi, length, factor);
                *v0 += bx.tr_mul(&(&fe * sp)) * (length * (b - a) * w);
            }
        }
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn BeamIntegration> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scheme() -> HingeMidpoint {
        HingeMidpoint::new(0.5, 0.25, ElasticInterior::planar(100.0, 10.0)).unwrap()
    }

    #[test]
    fn test_weights_and_interior_cover_length() {
        let h = scheme();
        let w = h.section_weights(2, 5.0).unwrap();
        let total = w.iter().sum::<f64>() + h.elastic_fraction(5.0);
        assert_relative_eq!(total, 1.0, epsilon = 1e-14);
        let x = h.section_locations(2, 5.0).unwrap();
        assert_relative_eq!(x[0], 0.05);
        assert_relative_eq!(x[1], 1.0 - 0.025);
    }

    #[test]
    fn test_full_interior_matches_elastic_flexibility() {
        // Vanishing hinges leave the classical flexibility L/3EI, -L/6EI
        let h = HingeMidpoint::new(1e-9, 1e-9, ElasticInterior::planar(100.0, 10.0)).unwrap();
        let mut f = Mat::zeros(3, 3);
        h.add_elastic_flexibility(ElementFamily::Planar, 3.0, &mut f);
        assert_relative_eq!(f[(0, 0)], 3.0 / 100.0, epsilon = 1e-9);
        assert_relative_eq!(f[(1, 1)], 3.0 / 30.0, epsilon = 1e-9);
        assert_relative_eq!(f[(2, 2)], 3.0 / 30.0, epsilon = 1e-9);
        assert_relative_eq!(f[(1, 2)], -3.0 / 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_load_end_rotations() {
        // Simply supported span under w: end rotations w L³ / 24 EI
        let h = HingeMidpoint::new(1e-9, 1e-9, ElasticInterior::planar(100.0, 10.0)).unwrap();
        let mut v0 = Vec::zeros(3);
        let (w, l) = (2.0, 3.0);
        h.add_elastic_deformations(ElementFamily::Planar, &ElementLoad::uniform(w, 0.0), 1.0, l, &mut v0)
            .unwrap();
        let theta = w * l.powi(3) / (24.0 * 10.0);
        assert_relative_eq!(v0[1].abs(), theta, epsilon = 1e-8);
        assert_relative_eq!(v0[2].abs(), theta, epsilon = 1e-8);
        assert_relative_eq!(v0[1], -v0[2], epsilon = 1e-8);
    }

    #[test]
    fn test_requires_two_sections() {
        assert!(scheme().check_sections(3).is_err());
        assert!(scheme().check_sections(2).is_ok());
    }

    #[test]
    fn test_hinges_longer_than_element() {
        let h = scheme();
        assert!(h.check_length(0.75).is_ok());
        assert!(matches!(h.check_length(0.7), Err(FlexError::Configuration(_))));
        assert!(h.section_weights(2, 0.7).is_err());
    }

    #[test]
    fn test_invalid_hinge_length() {
        assert!(HingeMidpoint::new(0.0, 0.1, ElasticInterior::planar(1.0, 1.0)).is_err());
    }
}
