//! Gauss-Legendre integration, sections strictly inside the element

use gauss_quad::GaussLegendre;

use super::BeamIntegration;
use crate::error::{FlexError, FlexResult};

/// Gauss-Legendre rule; exact for polynomials up to degree `2n - 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct Legendre;

impl Legendre {
    /// Points and weights on [0, 1], points ascending
    pub fn rule(n: usize) -> FlexResult<(std::vec::Vec<f64>, std::vec::Vec<f64>)> {
        if n == 1 {
            return Ok((vec![0.5], vec![1.0]));
        }
        let rule = GaussLegendre::new(n).map_err(|e| {
            FlexError::Configuration(format!("no {}-point Gauss-Legendre rule: {:?}", n, e))
        })?;
        let mut pairs: std::vec::Vec<(f64, f64)> = rule
            .into_node_weight_pairs()
            .into_iter()
            .map(|(x, w)| (0.5 * (x + 1.0), 0.5 * w))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(pairs.into_iter().unzip())
    }
}

impl BeamIntegration for Legendre {
    fn name(&self) -> &'static str {
        "Legendre"
    }

    fn check_sections(&self, n: usize) -> FlexResult<()> {
        Self::rule(n).map(|_| ())
    }

    fn section_locations(&self, n: usize, _length: f64) -> FlexResult<std::vec::Vec<f64>> {
        Ok(Self::rule(n)?.0)
    }

    fn section_weights(&self, n: usize, _length: f64) -> FlexResult<std::vec::Vec<f64>> {
        Ok(Self::rule(n)?.1)
    }

    fn box_clone(&self) -> Box<dyn BeamIntegration> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_locations_are_interior_and_sorted() {
        let x = Legendre.section_locations(5, 2.0).unwrap();
        assert!(x.windows(2).all(|p| p[0] < p[1]));
        assert!(x[0] > 0.0 && x[4] < 1.0);
        assert_relative_eq!(x[2], 0.5, epsilon = 1e-14);
    }

    #[test]
    fn test_two_point_rule() {
        let (x, w) = Legendre::rule(2).unwrap();
        let r = 0.5 / 3f64.sqrt();
        assert_relative_eq!(x[0], 0.5 - r, epsilon = 1e-14);
        assert_relative_eq!(x[1], 0.5 + r, epsilon = 1e-14);
        assert_relative_eq!(w[0], 0.5, epsilon = 1e-14);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for n in 1..=10 {
            let w = Legendre.section_weights(n, 1.0).unwrap();
            assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_exact_for_degree_2n_minus_1() {
        for n in 1..=8 {
            let (x, w) = Legendre::rule(n).unwrap();
            let degree = 2 * n - 1;
            let integral: f64 = x.iter().zip(&w).map(|(x, w)| w * x.powi(degree as i32)).sum();
            assert_relative_eq!(integral, 1.0 / (degree as f64 + 1.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_symmetric_rule() {
        let (x, w) = Legendre::rule(4).unwrap();
        assert_relative_eq!(x[0] + x[3], 1.0, epsilon = 1e-14);
        assert_relative_eq!(w[0], w[3], epsilon = 1e-14);
    }

    #[test]
    fn test_zero_sections_rejected() {
        assert!(Legendre.check_sections(0).is_err());
    }
}
