//! Mathematical utilities for element state determination

use nalgebra::{DMatrix, DVector, Matrix3};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;

/// Invert a square matrix, returning `None` when it is singular
/// or the result is not finite
pub fn invert(a: &Mat) -> Option<Mat> {
    if a.nrows() != a.ncols() {
        return None;
    }
    let inv = a.clone().lu().try_inverse()?;
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().lu().solve(b)
}

/// Maximum absolute difference between the symmetric entries of `a`
pub fn asymmetry(a: &Mat) -> f64 {
    let n = a.nrows().min(a.ncols());
    let mut max = 0.0_f64;
    for i in 0..n {
        for j in (i + 1)..n {
            max = max.max((a[(i, j)] - a[(j, i)]).abs());
        }
    }
    max
}

/// Compute the local axes of a 3D frame element
///
/// # Arguments
/// * `i_node` - Start node coordinates [X, Y, Z]
/// * `j_node` - End node coordinates [X, Y, Z]
/// * `rotation` - Member rotation about its longitudinal axis (radians)
///
/// # Returns
/// The 3x3 direction cosine matrix (rows are local x, y, z) and the
/// element length, or `None` for a zero-length element
pub fn local_axes(i_node: &[f64; 3], j_node: &[f64; 3], rotation: f64) -> Option<(Mat3, f64)> {
    let dx = j_node[0] - i_node[0];
    let dy = j_node[1] - i_node[1];
    let dz = j_node[2] - i_node[2];

    let length = (dx * dx + dy * dy + dz * dz).sqrt();
    if length < 1e-10 {
        return None;
    }

    let x = nalgebra::Vector3::new(dx / length, dy / length, dz / length);

    // Vertical members: y lies in the XY plane, z is global Z.
    // Horizontal members: y is global Y.
    // Inclined members: z is horizontal, y = z cross x.
    let (y, z) = if x[0].abs() < 1e-10 && x[2].abs() < 1e-10 {
        let y = if x[1] > 0.0 {
            nalgebra::Vector3::new(-1.0, 0.0, 0.0)
        } else {
            nalgebra::Vector3::new(1.0, 0.0, 0.0)
        };
        (y, nalgebra::Vector3::new(0.0, 0.0, 1.0))
    } else if dy.abs() < 1e-10 {
        let y = nalgebra::Vector3::new(0.0, 1.0, 0.0);
        let z = x.cross(&y).normalize();
        (y, z)
    } else {
        let proj = nalgebra::Vector3::new(dx, 0.0, dz);
        let z = if x[1] > 0.0 {
            proj.cross(&x).normalize()
        } else {
            x.cross(&proj).normalize()
        };
        let y = z.cross(&x).normalize();
        (y, z)
    };

    let (y, z) = if rotation.abs() > 1e-10 {
        let (sin_r, cos_r) = rotation.sin_cos();
        (y * cos_r + z * sin_r, -y * sin_r + z * cos_r)
    } else {
        (y, z)
    };

    #[rustfmt::skip]
    let r = Mat3::new(
        x[0], x[1], x[2],
        y[0], y[1], y[2],
        z[0], z[1], z[2],
    );

    Some((r, length))
}
