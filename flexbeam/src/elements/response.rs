//! Section response codes and force interpolation along the element

use serde::{Deserialize, Serialize};

use crate::math::Mat;

/// Physical meaning of one generalized section response component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCode {
    /// Axial force
    Axial,
    /// Bending moment about local z
    MomentZ,
    /// Shear force along local y
    ShearY,
    /// Bending moment about local y
    MomentY,
    /// Shear force along local z
    ShearZ,
    /// Torque about the element axis
    Torque,
    /// A tag this crate does not interpret; contributes nothing
    Other(i32),
}

impl ResponseCode {
    /// Map an integer tag to a response code
    ///
    /// Tags follow the common section numbering: 1 = Mz, 2 = P, 3 = Vy,
    /// 4 = My, 5 = Vz, 6 = T.
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            1 => Self::MomentZ,
            2 => Self::Axial,
            3 => Self::ShearY,
            4 => Self::MomentY,
            5 => Self::ShearZ,
            6 => Self::Torque,
            other => Self::Other(other),
        }
    }

    /// Integer tag of this response code
    pub fn tag(&self) -> i32 {
        match self {
            Self::MomentZ => 1,
            Self::Axial => 2,
            Self::ShearY => 3,
            Self::MomentY => 4,
            Self::ShearZ => 5,
            Self::Torque => 6,
            Self::Other(tag) => *tag,
        }
    }
}

/// Element family, fixing the size of the basic system
///
/// Basic forces are ordered `[N, Mz_i, Mz_j]` for planar elements and
/// `[N, Mz_i, Mz_j, My_i, My_j, T]` for spatial elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementFamily {
    Planar,
    Spatial,
}

const PLANAR_CODES: [ResponseCode; 3] = [
    ResponseCode::Axial,
    ResponseCode::MomentZ,
    ResponseCode::ShearY,
];

const SPATIAL_CODES: [ResponseCode; 6] = [
    ResponseCode::Axial,
    ResponseCode::MomentZ,
    ResponseCode::ShearY,
    ResponseCode::MomentY,
    ResponseCode::ShearZ,
    ResponseCode::Torque,
];

impl ElementFamily {
    /// Number of basic degrees of freedom
    pub fn nebd(&self) -> usize {
        match self {
            Self::Planar => 3,
            Self::Spatial => 6,
        }
    }

    /// Number of nodal degrees of freedom per node
    pub fn dofs_per_node(&self) -> usize {
        match self {
            Self::Planar => 3,
            Self::Spatial => 6,
        }
    }

    /// Length of the basic reaction offset vector `p0`
    ///
    /// Planar: `[N, Vy_i, Vy_j]`. Spatial: `[N, Vy_i, Vy_j, Vz_i, Vz_j]`.
    pub fn reaction_len(&self) -> usize {
        match self {
            Self::Planar => 3,
            Self::Spatial => 5,
        }
    }

    /// Response codes this family interpolates
    pub fn supported_codes(&self) -> &'static [ResponseCode] {
        match self {
            Self::Planar => &PLANAR_CODES,
            Self::Spatial => &SPATIAL_CODES,
        }
    }

    /// Whether this family interpolates `code`
    pub fn supports(&self, code: ResponseCode) -> bool {
        self.supported_codes().contains(&code)
    }

    /// Add the interpolation row for `code` at `xi = x / L` into `row`
    ///
    /// Axial force and torque are constant, moments vary linearly between
    /// the end values, and shears are the moment gradient `(q_i + q_j) / L`.
    /// Codes outside the family leave `row` untouched.
    fn fill_row(&self, code: ResponseCode, xi: f64, length: f64, row: &mut [f64]) {
        if !self.supports(code) {
            return;
        }
        let one_over_l = 1.0 / length;
        match code {
            ResponseCode::Axial => row[0] = 1.0,
            ResponseCode::MomentZ => {
                row[1] = xi - 1.0;
                row[2] = xi;
            }
            ResponseCode::ShearY => {
                row[1] = one_over_l;
                row[2] = one_over_l;
            }
            ResponseCode::MomentY => {
                row[3] = xi - 1.0;
                row[4] = xi;
            }
            ResponseCode::ShearZ => {
                row[3] = one_over_l;
                row[4] = one_over_l;
            }
            ResponseCode::Torque => row[5] = 1.0,
            ResponseCode::Other(_) => {}
        }
    }

    /// Force interpolation matrix `b(x)` (`codes.len() x nebd`) mapping basic
    /// forces to section forces at `xi = x / L`
    pub fn force_interpolation(&self, codes: &[ResponseCode], xi: f64, length: f64) -> Mat {
        let nebd = self.nebd();
        let mut b = Mat::zeros(codes.len(), nebd);
        let mut row = vec![0.0; nebd];
        for (k, &code) in codes.iter().enumerate() {
            row.iter_mut().for_each(|v| *v = 0.0);
            self.fill_row(code, xi, length, &mut row);
            for (j, &v) in row.iter().enumerate() {
                b[(k, j)] = v;
            }
        }
        b
    }
}
