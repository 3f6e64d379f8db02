//! Small-displacement transformation for planar and spatial frame elements

use super::CrdTransformation;
use crate::elements::{ElementFamily, Node};
use crate::error::{FlexError, FlexResult};
use crate::math::{self, Mat, Vec};

/// Linear (small displacement) coordinate transformation
///
/// Basic deformations are `[axial, θz_i, θz_j]` (planar) or
/// `[axial, θz_i, θz_j, θy_i, θy_j, twist]` (spatial), each rotation
/// measured from the chord.
#[derive(Debug, Clone)]
pub struct LinearTransformation {
    family: ElementFamily,
    length: f64,
    /// Basic-from-global compatibility matrix (nebd x ndof)
    a_bg: Mat,
    /// Global forces per unit basic reaction offset (ndof x reaction_len)
    p0_map: Mat,
    trial: Vec,
    committed: Vec,
}

fn check_node(node: &Node, family: ElementFamily) -> FlexResult<()> {
    if node.ndf != family.dofs_per_node() {
        return Err(FlexError::Configuration(format!(
            "{:?} element needs nodes with {} freedoms, node has {}",
            family,
            family.dofs_per_node(),
            node.ndf
        )));
    }
    Ok(())
}

impl LinearTransformation {
    /// Transformation for a planar element between two planar nodes
    pub fn planar(node_i: &Node, node_j: &Node) -> FlexResult<Self> {
        let family = ElementFamily::Planar;
        check_node(node_i, family)?;
        check_node(node_j, family)?;

        let dx = node_j.x - node_i.x;
        let dy = node_j.y - node_i.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length < 1e-10 {
            return Err(FlexError::Configuration("element has zero length".to_string()));
        }
        let c = dx / length;
        let s = dy / length;

        let mut t_lg = Mat::zeros(6, 6);
        for node in 0..2 {
            let o = node * 3;
            t_lg[(o, o)] = c;
            t_lg[(o, o + 1)] = s;
            t_lg[(o + 1, o)] = -s;
            t_lg[(o + 1, o + 1)] = c;
            t_lg[(o + 2, o + 2)] = 1.0;
        }

        let one_over_l = 1.0 / length;
        #[rustfmt::skip]
        let a_bl = Mat::from_row_slice(3, 6, &[
            -1.0, 0.0,        0.0, 1.0, 0.0,         0.0,
             0.0, one_over_l, 1.0, 0.0, -one_over_l, 0.0,
             0.0, one_over_l, 0.0, 0.0, -one_over_l, 1.0,
        ]);

        // p0 = [N, Vy_i, Vy_j] acts on local dofs 0, 1 and 4
        let mut e = Mat::zeros(6, 3);
        e[(0, 0)] = 1.0;
        e[(1, 1)] = 1.0;
        e[(4, 2)] = 1.0;

        Ok(Self {
            family,
            length,
            a_bg: &a_bl * &t_lg,
            p0_map: t_lg.transpose() * e,
            trial: Vec::zeros(6),
            committed: Vec::zeros(6),
        })
    }

    /// Transformation for a spatial element, `rotation` about the element axis
    pub fn spatial(node_i: &Node, node_j: &Node, rotation: f64) -> FlexResult<Self> {
        let family = ElementFamily::Spatial;
        check_node(node_i, family)?;
        check_node(node_j, family)?;

        let (r, length) = math::local_axes(&node_i.coords(), &node_j.coords(), rotation)
            .ok_or_else(|| FlexError::Configuration("element has zero length".to_string()))?;

        let mut t_lg = Mat::zeros(12, 12);
        for block in 0..4 {
            let o = block * 3;
            for row in 0..3 {
                for col in 0..3 {
                    t_lg[(o + row, o + col)] = r[(row, col)];
                }
            }
        }

        let one_over_l = 1.0 / length;
        let mut a_bl = Mat::zeros(6, 12);
        a_bl[(0, 0)] = -1.0;
        a_bl[(0, 6)] = 1.0;
        // θz from the chord rotation in the local xy plane
        for row in [1, 2] {
            a_bl[(row, 1)] = one_over_l;
            a_bl[(row, 7)] = -one_over_l;
        }
        a_bl[(1, 5)] = 1.0;
        a_bl[(2, 11)] = 1.0;
        // θy from the chord rotation in the local xz plane
        for row in [3, 4] {
            a_bl[(row, 2)] = -one_over_l;
            a_bl[(row, 8)] = one_over_l;
        }
        a_bl[(3, 4)] = 1.0;
        a_bl[(4, 10)] = 1.0;
        a_bl[(5, 3)] = -1.0;
        a_bl[(5, 9)] = 1.0;

        // p0 = [N, Vy_i, Vy_j, Vz_i, Vz_j] acts on local dofs 0, 1, 7, 2, 8
        let mut e = Mat::zeros(12, 5);
        e[(0, 0)] = 1.0;
        e[(1, 1)] = 1.0;
        e[(7, 2)] = 1.0;
        e[(2, 3)] = 1.0;
        e[(8, 4)] = 1.0;

        Ok(Self {
            family,
            length,
            a_bg: &a_bl * &t_lg,
            p0_map: t_lg.transpose() * e,
            trial: Vec::zeros(12),
            committed: Vec::zeros(12),
        })
    }
}

impl CrdTransformation for LinearTransformation {
    fn family(&self) -> ElementFamily {
        self.family
    }

    fn initial_length(&self) -> f64 {
        self.length
    }

    fn update(&mut self, nodal: &Vec) -> FlexResult<()> {
        if nodal.len() != self.trial.len() {
            return Err(FlexError::DimensionMismatch {
                expected: self.trial.len(),
                found: nodal.len(),
            });
        }
        self.trial.copy_from(nodal);
        Ok(())
    }

    fn basic_trial_displacement(&self) -> Vec {
        &self.a_bg * &self.trial
    }

    fn basic_incremental_displacement(&self) -> Vec {
        &self.a_bg * (&self.trial - &self.committed)
    }

    fn global_resisting_force(&self, q: &Vec, p0: &Vec) -> Vec {
        let mut p = self.a_bg.tr_mul(q);
        if p0.len() == self.p0_map.ncols() {
            p += &self.p0_map * p0;
        }
        p
    }

    fn global_stiffness(&self, kb: &Mat, _q: &Vec) -> Mat {
        self.a_bg.tr_mul(kb) * &self.a_bg
    }

    fn initial_global_stiffness(&self, kb: &Mat) -> Mat {
        self.a_bg.tr_mul(kb) * &self.a_bg
    }

    fn commit_state(&mut self) {
        self.committed.copy_from(&self.trial);
    }

    fn revert_to_last_commit(&mut self) {
        self.trial.copy_from(&self.committed);
    }

    fn revert_to_start(&mut self) {
        self.trial.fill(0.0);
        self.committed.fill(0.0);
    }

    fn box_clone(&self) -> Box<dyn CrdTransformation> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planar_rigid_body_motion_is_removed() {
        let mut t = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(3.0, 4.0)).unwrap();
        assert_relative_eq!(t.initial_length(), 5.0);

        // Rigid translation plus a small rigid rotation about node i
        let theta = 1e-3;
        let u = Vec::from_vec(vec![
            0.2, -0.1, theta,
            0.2 - 4.0 * theta, -0.1 + 3.0 * theta, theta,
        ]);
        t.update(&u).unwrap();
        assert!(t.basic_trial_displacement().norm() < 1e-12);
    }

    #[test]
    fn test_planar_axial_stretch() {
        let mut t = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(2.0, 0.0)).unwrap();
        t.update(&Vec::from_vec(vec![0.0, 0.0, 0.0, 0.01, 0.0, 0.0])).unwrap();
        let v = t.basic_trial_displacement();
        assert_relative_eq!(v[0], 0.01);
        assert_relative_eq!(v[1], 0.0);
    }

    #[test]
    fn test_planar_forces_are_in_equilibrium() {
        let t = LinearTransformation::planar(&Node::planar(1.0, 1.0), &Node::planar(4.0, 5.0)).unwrap();
        let p = t.global_resisting_force(&Vec::from_vec(vec![10.0, 3.0, -7.0]), &Vec::zeros(3));
        assert_relative_eq!(p[0] + p[3], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1] + p[4], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_planar_reaction_offsets() {
        let t = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(2.0, 0.0)).unwrap();
        let p = t.global_resisting_force(&Vec::zeros(3), &Vec::from_vec(vec![-1.0, -2.0, -3.0]));
        assert_relative_eq!(p[0], -1.0);
        assert_relative_eq!(p[1], -2.0);
        assert_relative_eq!(p[4], -3.0);
    }

    #[test]
    fn test_node_freedom_mismatch() {
        let err = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::spatial(1.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, FlexError::Configuration(_)));
    }

    #[test]
    fn test_zero_length() {
        let err = LinearTransformation::planar(&Node::planar(1.0, 1.0), &Node::planar(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, FlexError::Configuration(_)));
        let err = LinearTransformation::spatial(&Node::spatial(0.0, 0.0, 0.0), &Node::spatial(0.0, 0.0, 0.0), 0.0)
            .unwrap_err();
        assert!(matches!(err, FlexError::Configuration(_)));
    }

    #[test]
    fn test_spatial_rigid_rotation_is_removed() {
        let mut t = LinearTransformation::spatial(
            &Node::spatial(0.0, 0.0, 0.0),
            &Node::spatial(2.0, 1.0, 2.0),
            0.4,
        )
        .unwrap();
        // Small rigid rotation w about node i: u_j = w x (x_j - x_i)
        let w = [1e-3, -2e-3, 5e-4];
        let d = [2.0, 1.0, 2.0];
        let uj = [
            w[1] * d[2] - w[2] * d[1],
            w[2] * d[0] - w[0] * d[2],
            w[0] * d[1] - w[1] * d[0],
        ];
        let u = Vec::from_vec(vec![
            0.0, 0.0, 0.0, w[0], w[1], w[2],
            uj[0], uj[1], uj[2], w[0], w[1], w[2],
        ]);
        t.update(&u).unwrap();
        assert!(t.basic_trial_displacement().norm() < 1e-12);
    }

    #[test]
    fn test_spatial_stiffness_symmetry() {
        let t = LinearTransformation::spatial(&Node::spatial(0.0, 0.0, 0.0), &Node::spatial(0.0, 3.0, 1.0), 0.0)
            .unwrap();
        let kb = Mat::from_fn(6, 6, |i, j| if i == j { 10.0 + i as f64 } else { 1.0 });
        let k = t.global_stiffness(&kb, &Vec::zeros(6));
        assert_eq!(k.shape(), (12, 12));
        assert!(math::asymmetry(&k) < 1e-9);
    }

    #[test]
    fn test_incremental_displacement() {
        let mut t = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(1.0, 0.0)).unwrap();
        t.update(&Vec::from_vec(vec![0.0, 0.0, 0.0, 0.1, 0.0, 0.0])).unwrap();
        t.commit_state();
        t.update(&Vec::from_vec(vec![0.0, 0.0, 0.0, 0.15, 0.0, 0.0])).unwrap();
        assert_relative_eq!(t.basic_incremental_displacement()[0], 0.05, epsilon = 1e-14);
        t.revert_to_last_commit();
        assert_relative_eq!(t.basic_trial_displacement()[0], 0.1, epsilon = 1e-14);
    }

    #[test]
    fn test_wrong_displacement_length() {
        let mut t = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(1.0, 0.0)).unwrap();
        let err = t.update(&Vec::zeros(12)).unwrap_err();
        assert_eq!(err, FlexError::DimensionMismatch { expected: 6, found: 12 });
    }
}
