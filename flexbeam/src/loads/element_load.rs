//! Loads applied along an element

use serde::{Deserialize, Serialize};

use crate::elements::{ElementFamily, ResponseCode};
use crate::error::{FlexError, FlexResult};
use crate::math::Vec;

/// A load acting on the element between its nodes, in local axes
///
/// Section forces and reactions are those of the simply supported basic
/// system; the end moments come from the compatibility iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementLoad {
    /// Uniform distributed load over the whole element (force per length)
    Uniform { wy: f64, wz: f64, wx: f64 },
    /// Concentrated load at `a_over_l` of the length from node i
    Point {
        py: f64,
        pz: f64,
        px: f64,
        a_over_l: f64,
    },
    /// Imposed basic deformation (lack of fit, thermal curvature, ...)
    BasicDeformation(std::vec::Vec<f64>),
}

impl ElementLoad {
    /// Uniform load in the local xy plane
    pub fn uniform(wy: f64, wx: f64) -> Self {
        Self::Uniform { wy, wz: 0.0, wx }
    }

    /// Concentrated load in the local xy plane
    pub fn point(py: f64, px: f64, a_over_l: f64) -> Self {
        Self::Point {
            py,
            pz: 0.0,
            px,
            a_over_l,
        }
    }

    /// Check the load can act on an element of `family`
    pub fn validate(&self, family: ElementFamily) -> FlexResult<()> {
        let planar = family == ElementFamily::Planar;
        match self {
            Self::Uniform { wz, .. } if planar && *wz != 0.0 => Err(FlexError::InvalidInput(
                "out-of-plane load on a planar element".to_string(),
            )),
            Self::Point { pz, .. } if planar && *pz != 0.0 => Err(FlexError::InvalidInput(
                "out-of-plane load on a planar element".to_string(),
            )),
            Self::Point { a_over_l, .. } if !(0.0..=1.0).contains(a_over_l) => Err(
                FlexError::InvalidInput(format!("a/L must lie in [0, 1], got {}", a_over_l)),
            ),
            Self::BasicDeformation(v) if v.len() != family.nebd() => Err(FlexError::DimensionMismatch {
                expected: family.nebd(),
                found: v.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Relative position of a discontinuity in the section force field
    pub fn kink(&self) -> Option<f64> {
        match self {
            Self::Point { a_over_l, .. } => Some(*a_over_l),
            _ => None,
        }
    }

    /// Section force for `code` at `xi = x / L`
    pub fn section_force(&self, code: ResponseCode, xi: f64, length: f64) -> f64 {
        let x = xi * length;
        match *self {
            Self::Uniform { wy, wz, wx } => match code {
                ResponseCode::Axial => wx * (length - x),
                ResponseCode::MomentZ => wy * 0.5 * x * (x - length),
                ResponseCode::ShearY => wy * (x - 0.5 * length),
                ResponseCode::MomentY => wz * 0.5 * x * (length - x),
                ResponseCode::ShearZ => wz * (0.5 * length - x),
                _ => 0.0,
            },
            Self::Point {
                py,
                pz,
                px,
                a_over_l,
            } => {
                let a = a_over_l * length;
                let (vy1, vy2) = (py * (1.0 - a_over_l), py * a_over_l);
                let (vz1, vz2) = (pz * (1.0 - a_over_l), pz * a_over_l);
                let before = x <= a;
                match code {
                    ResponseCode::Axial if before => px,
                    ResponseCode::MomentZ if before => -x * vy1,
                    ResponseCode::MomentZ => -(length - x) * vy2,
                    ResponseCode::ShearY if before => -vy1,
                    ResponseCode::ShearY => vy2,
                    ResponseCode::MomentY if before => x * vz1,
                    ResponseCode::MomentY => (length - x) * vz2,
                    ResponseCode::ShearZ if before => vz1,
                    ResponseCode::ShearZ => -vz2,
                    _ => 0.0,
                }
            }
            Self::BasicDeformation(_) => 0.0,
        }
    }

    /// Section force vector for a section with `codes`, scaled by `factor`
    ///
    /// Codes the family does not interpolate receive no load.
    pub fn section_forces(
        &self,
        family: ElementFamily,
        codes: &[ResponseCode],
        xi: f64,
        length: f64,
        factor: f64,
    ) -> Vec {
        Vec::from_iterator(
            codes.len(),
            codes.iter().map(|&code| {
                if family.supports(code) {
                    factor * self.section_force(code, xi, length)
                } else {
                    0.0
                }
            }),
        )
    }

    /// Accumulate the basic system reactions into `p0`
    pub fn add_reactions(&self, family: ElementFamily, length: f64, factor: f64, p0: &mut Vec) {
        let spatial = family == ElementFamily::Spatial;
        match *self {
            Self::Uniform { wy, wz, wx } => {
                p0[0] -= factor * wx * length;
                let vy = factor * 0.5 * wy * length;
                p0[1] -= vy;
                p0[2] -= vy;
                if spatial {
                    let vz = factor * 0.5 * wz * length;
                    p0[3] -= vz;
                    p0[4] -= vz;
                }
            }
            Self::Point {
                py,
                pz,
                px,
                a_over_l,
            } => {
                p0[0] -= factor * px;
                p0[1] -= factor * py * (1.0 - a_over_l);
                p0[2] -= factor * py * a_over_l;
                if spatial {
                    p0[3] -= factor * pz * (1.0 - a_over_l);
                    p0[4] -= factor * pz * a_over_l;
                }
            }
            Self::BasicDeformation(_) => {}
        }
    }

    /// Imposed basic deformation, if this load is one
    pub fn basic_deformation(&self) -> Option<&[f64]> {
        match self {
            Self::BasicDeformation(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_midspan_moment() {
        let load = ElementLoad::uniform(-2.0, 0.0);
        // wL²/8 sagging at midspan of the simply supported basic system
        let m = load.section_force(ResponseCode::MomentZ, 0.5, 4.0);
        assert_relative_eq!(m, 2.0 * 16.0 / 8.0);
        assert_relative_eq!(load.section_force(ResponseCode::MomentZ, 0.0, 4.0), 0.0);
        assert_relative_eq!(load.section_force(ResponseCode::MomentZ, 1.0, 4.0), 0.0);
    }

    #[test]
    fn test_uniform_shear_is_moment_gradient() {
        let load = ElementLoad::Uniform { wy: 3.0, wz: -1.5, wx: 0.0 };
        let (l, xi, h) = (2.0, 0.3, 1e-6);
        for (m, v) in [
            (ResponseCode::MomentZ, ResponseCode::ShearY),
            (ResponseCode::MomentY, ResponseCode::ShearZ),
        ] {
            let dm = (load.section_force(m, xi + h, l) - load.section_force(m, xi - h, l)) / (2.0 * h * l);
            assert_relative_eq!(dm, load.section_force(v, xi, l), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_point_load_moment_at_load() {
        let load = ElementLoad::point(-10.0, 0.0, 0.25);
        let m = load.section_force(ResponseCode::MomentZ, 0.25, 4.0);
        // P a b / L with a = 1, b = 3
        assert_relative_eq!(m, 10.0 * 1.0 * 3.0 / 4.0);
        let right = load.section_force(ResponseCode::MomentZ, 0.2500001, 4.0);
        assert_relative_eq!(right, m, epsilon = 1e-5);
    }

    #[test]
    fn test_reactions_balance_load() {
        let mut p0 = Vec::zeros(3);
        ElementLoad::uniform(-2.0, 1.0).add_reactions(ElementFamily::Planar, 3.0, 1.0, &mut p0);
        assert_relative_eq!(p0[0], -3.0);
        assert_relative_eq!(p0[1] + p0[2], 6.0);

        let mut p0 = Vec::zeros(5);
        ElementLoad::Point { py: 0.0, pz: 4.0, px: 0.0, a_over_l: 0.75 }
            .add_reactions(ElementFamily::Spatial, 1.0, 2.0, &mut p0);
        assert_relative_eq!(p0[3], -2.0);
        assert_relative_eq!(p0[4], -6.0);
    }

    #[test]
    fn test_validation() {
        assert!(ElementLoad::point(1.0, 0.0, 1.5).validate(ElementFamily::Planar).is_err());
        assert!(ElementLoad::Uniform { wy: 0.0, wz: 1.0, wx: 0.0 }
            .validate(ElementFamily::Planar)
            .is_err());
        assert!(ElementLoad::BasicDeformation(vec![0.0; 3])
            .validate(ElementFamily::Spatial)
            .is_err());
        assert!(ElementLoad::uniform(1.0, 1.0).validate(ElementFamily::Planar).is_ok());
    }

    #[test]
    fn test_unsupported_codes_get_no_load() {
        let load = ElementLoad::uniform(1.0, 1.0);
        let s = load.section_forces(
            ElementFamily::Planar,
            &[ResponseCode::Axial, ResponseCode::Torque, ResponseCode::Other(3)],
            0.5,
            2.0,
            1.0,
        );
        assert_relative_eq!(s[0], 1.0);
        assert_relative_eq!(s[1], 0.0);
        assert_relative_eq!(s[2], 0.0);
    }
}
