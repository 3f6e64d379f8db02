//! Gauss-Lobatto integration, with sections at both element ends

use super::{legendre_derivatives, legendre_pair, BeamIntegration, MAX_ROOT_ITERATIONS};
use crate::error::{FlexError, FlexResult};

/// Gauss-Lobatto rule; exact for polynomials up to degree `2n - 3`
#[derive(Debug, Clone, Copy, Default)]
pub struct Lobatto;

impl Lobatto {
    /// Points and weights on [0, 1]
    pub fn rule(n: usize) -> (std::vec::Vec<f64>, std::vec::Vec<f64>) {
        if n < 2 {
            return (vec![0.5; n], vec![1.0; n]);
        }
        let m = n - 1;
        let nf = n as f64;
        let mut x = vec![0.0; n];
        let mut w = vec![0.0; n];
        x[0] = -1.0;
        x[m] = 1.0;
        w[0] = 2.0 / (nf * (nf - 1.0));
        w[m] = w[0];

        // interior points are the roots of P'_{n-1}
        for i in 1..m {
            let mut xi = -(std::f64::consts::PI * i as f64 / m as f64).cos();
            for _ in 0..MAX_ROOT_ITERATIONS {
                let (dp, d2p) = legendre_derivatives(m, xi);
                let dx = dp / d2p;
                xi -= dx;
                if dx.abs() < 1e-15 {
                    break;
                }
            }
            let (p, _) = legendre_pair(m, xi);
            x[i] = xi;
            w[i] = 2.0 / (nf * (nf - 1.0) * p * p);
        }

        let points = x.iter().map(|x| 0.5 * (x + 1.0)).collect();
        let weights = w.iter().map(|w| 0.5 * w).collect();
        (points, weights)
    }
}

impl BeamIntegration for Lobatto {
    fn name(&self) -> &'static str {
        "Lobatto"
    }

    fn check_sections(&self, n: usize) -> FlexResult<()> {
        if n < 2 {
            return Err(FlexError::Configuration(format!(
                "Lobatto integration needs at least two sections, got {}",
                n
            )));
        }
        Ok(())
    }

    fn section_locations(&self, n: usize, _length: f64) -> FlexResult<std::vec::Vec<f64>> {
        Ok(Self::rule(n).0)
    }

    fn section_weights(&self, n: usize, _length: f64) -> FlexResult<std::vec::Vec<f64>> {
        Ok(Self::rule(n).1)
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
    fn test_three_point_rule() {
        let (x, w) = Lobatto::rule(3);
        assert_relative_eq!(x[0], 0.0);
        assert_relative_eq!(x[1], 0.5, epsilon = 1e-14);
        assert_relative_eq!(x[2], 1.0);
        assert_relative_eq!(w[0], 1.0 / 6.0, epsilon = 1e-14);
        assert_relative_eq!(w[1], 2.0 / 3.0, epsilon = 1e-14);
    }

    #[test]
    fn test_five_point_rule() {
        let (x, w) = Lobatto::rule(5);
        let r = 0.5 * (3.0f64 / 7.0).sqrt();
        assert_relative_eq!(x[1], 0.5 - r, epsilon = 1e-13);
        assert_relative_eq!(x[3], 0.5 + r, epsilon = 1e-13);
        assert_relative_eq!(w[1], 49.0 / 180.0, epsilon = 1e-13);
        assert_relative_eq!(w[2], 32.0 / 90.0, epsilon = 1e-13);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for n in 2..=10 {
            let w = Lobatto.section_weights(n, 3.0).unwrap();
            assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-13);
            let scaled: f64 = w.iter().map(|w| w * 3.0).sum();
            assert_relative_eq!(scaled, 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_exactness() {
        for n in 2..=8 {
            let (x, w) = Lobatto::rule(n);
            let degree = (2 * n - 3) as i32;
            let integral: f64 = x.iter().zip(&w).map(|(x, w)| w * x.powi(degree)).sum();
            assert_relative_eq!(integral, 1.0 / (degree as f64 + 1.0), epsilon = 1e-13);
        }
    }

    #[test]
    fn test_needs_two_sections() {
        assert!(Lobatto.check_sections(1).is_err());
        assert!(Lobatto.check_sections(2).is_ok());
    }
}
