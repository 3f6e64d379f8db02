//! Material and geometric properties for building reference sections

use serde::{Deserialize, Serialize};

use crate::elements::ResponseCode;

/// Elastic material constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity in Pa
    pub e: f64,
    /// Shear modulus in Pa
    pub g: f64,
    /// Yield strength in Pa (optional)
    pub fy: Option<f64>,
}

impl Material {
    /// Create a new material
    pub fn new(e: f64, g: f64) -> Self {
        Self { e, g, fy: None }
    }

    /// Create an isotropic material, G = E / (2 (1 + nu))
    pub fn isotropic(e: f64, nu: f64) -> Self {
        Self::new(e, e / (2.0 * (1.0 + nu)))
    }

    /// Set the yield strength
    pub fn with_yield_strength(mut self, fy: f64) -> Self {
        self.fy = Some(fy);
        self
    }

    /// Structural steel (E = 200 GPa, G = 77 GPa, fy = 250 MPa)
    pub fn steel() -> Self {
        Self {
            e: 200e9,
            g: 77e9,
            fy: Some(250e6),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}

/// Geometric cross-section properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Area in m²
    pub a: f64,
    /// Moment of inertia about local y in m⁴
    pub iy: f64,
    /// Moment of inertia about local z in m⁴
    pub iz: f64,
    /// Torsional constant in m⁴
    pub j: f64,
    /// Shear area factor (shear area = alpha * A)
    pub alpha: f64,
    /// Plastic section modulus about y in m³
    pub zy: Option<f64>,
    /// Plastic section modulus about z in m³
    pub zz: Option<f64>,
}

impl SectionProperties {
    /// Create properties from basic values
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self {
            a,
            iy,
            iz,
            j,
            alpha: 5.0 / 6.0,
            zy: None,
            zz: None,
        }
    }

    /// Solid rectangle, `width` along local y and `depth` along local z
    /// for bending about z measured over `depth`
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let a = width * depth;
        let iz = width * depth.powi(3) / 12.0;
        let iy = depth * width.powi(3) / 12.0;

        // Approximate St. Venant constant for a rectangle
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self {
            a,
            iy,
            iz,
            j,
            alpha: 5.0 / 6.0,
            zy: Some(depth * width.powi(2) / 4.0),
            zz: Some(width * depth.powi(2) / 4.0),
        }
    }

    /// Solid circle
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        let a = std::f64::consts::PI * r.powi(2);
        let i = std::f64::consts::PI * r.powi(4) / 4.0;
        let z = 4.0 * r.powi(3) / 3.0;
        Self {
            a,
            iy: i,
            iz: i,
            j: 2.0 * i,
            alpha: 0.9,
            zy: Some(z),
            zz: Some(z),
        }
    }

    /// Elastic rigidity for one response component
    ///
    /// Returns `None` for codes with no rigidity defined here.
    pub fn rigidity(&self, material: &Material, code: ResponseCode) -> Option<f64> {
        match code {
            ResponseCode::Axial => Some(material.e * self.a),
            ResponseCode::MomentZ => Some(material.e * self.iz),
            ResponseCode::MomentY => Some(material.e * self.iy),
            ResponseCode::ShearY | ResponseCode::ShearZ => {
                Some(self.alpha * material.g * self.a)
            }
            ResponseCode::Torque => Some(material.g * self.j),
            ResponseCode::Other(_) => None,
        }
    }

    /// Plastic capacity for one response component
    ///
    /// Needs the material yield strength; moments also need the plastic
    /// modulus about the matching axis.
    pub fn plastic_capacity(&self, material: &Material, code: ResponseCode) -> Option<f64> {
        let fy = material.fy?;
        match code {
            ResponseCode::Axial => Some(fy * self.a),
            ResponseCode::MomentZ => self.zz.map(|z| fy * z),
            ResponseCode::MomentY => self.zy.map(|z| fy * z),
            ResponseCode::ShearY | ResponseCode::ShearZ => Some(fy / 3f64.sqrt() * self.alpha * self.a),
            ResponseCode::Torque | ResponseCode::Other(_) => None,
        }
    }
}
