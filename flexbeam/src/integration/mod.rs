//! Beam integration schemes
//!
//! A scheme places the element's section samples along its length and
//! weights them. Locations and weights are fractions of the length.
//! Plastic-hinge schemes may also integrate an elastic interior in closed
//! form, adding its flexibility and its deformations under element loads.

mod hinge;
mod legendre;
mod lobatto;

pub use hinge::{ElasticInterior, HingeMidpoint};
pub use legendre::Legendre;
pub use lobatto::Lobatto;

use std::fmt::Debug;

use crate::elements::ElementFamily;
use crate::error::{FlexError, FlexResult};
use crate::loads::ElementLoad;
use crate::math::{Mat, Vec};

/// Newton iterations allowed when locating polynomial roots
const MAX_ROOT_ITERATIONS: usize = 100;

/// Numerical integration along the element
pub trait BeamIntegration: Debug + Send {
    /// Short name of the scheme
    fn name(&self) -> &'static str;

    /// Check the scheme can integrate `n` sections
    fn check_sections(&self, n: usize) -> FlexResult<()> {
        if n == 0 {
            return Err(FlexError::Configuration(format!(
                "{} integration needs at least one section",
                self.name()
            )));
        }
        Ok(())
    }

    /// Check the scheme fits an element of the given length
    fn check_length(&self, _length: f64) -> FlexResult<()> {
        Ok(())
    }

    /// Section locations as fractions of the length
    fn section_locations(&self, n: usize, length: f64) -> FlexResult<std::vec::Vec<f64>>;

    /// Section weights as fractions of the length
    fn section_weights(&self, n: usize, length: f64) -> FlexResult<std::vec::Vec<f64>>;

    /// Fraction of the length integrated in closed form rather than by
    /// section samples
    fn elastic_fraction(&self, _length: f64) -> f64 {
        0.0
    }

    /// Add the flexibility of any closed-form region to `f`
    fn add_elastic_flexibility(&self, _family: ElementFamily, _length: f64, _f: &mut Mat) {}

    /// Add the deformations of any closed-form region under `load` to `v0`
    fn add_elastic_deformations(
        &self,
        _family: ElementFamily,
        _load: &ElementLoad,
        _factor: f64,
        _length: f64,
        _v0: &mut Vec,
    ) -> FlexResult<()> {
        Ok(())
    }

    /// Deep copy of this scheme
    fn box_clone(&self) -> Box<dyn BeamIntegration>;
}

impl Clone for Box<dyn BeamIntegration> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Legendre polynomials `(P_n(x), P_{n-1}(x))` by the three-term recurrence
pub(crate) fn legendre_pair(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 2..=n {
        let kf = k as f64;
        let next = ((2.0 * kf - 1.0) * x * p - (kf - 1.0) * p_prev) / kf;
        p_prev = p;
        p = next;
    }
    (p, p_prev)
}

/// First and second derivatives of `P_n` at an interior point `|x| < 1`
pub(crate) fn legendre_derivatives(n: usize, x: f64) -> (f64, f64) {
    let (p, p_prev) = legendre_pair(n, x);
    let nf = n as f64;
    let one_minus_x2 = 1.0 - x * x;
    let dp = nf * (p_prev - x * p) / one_minus_x2;
    let d2p = (2.0 * x * dp - nf * (nf + 1.0) * p) / one_minus_x2;
    (dp, d2p)
}
