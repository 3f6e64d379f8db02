//! flexbeam - force-based beam-column state determination
//!
//! This library implements the element side of flexibility-based frame
//! analysis: given trial nodal displacements, a [`ForceBeamColumn`] finds
//! basic forces that are in equilibrium along the element and compatible
//! with the nodal motion, then reports nodal resisting forces and tangent
//! stiffness to a global solver.
//!
//! The element is built from three collaborators:
//! - a [`SectionResponse`] per integration point (constitutive law),
//! - a [`BeamIntegration`] placing and weighting the sections,
//! - a [`CrdTransformation`] between nodal and basic systems.
//!
//! ## Example
//! ```rust
//! use flexbeam::prelude::*;
//!
//! let transf = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(3.0, 0.0)).unwrap();
//! let sections: Vec<Box<dyn SectionResponse>> = (0..5)
//!     .map(|_| Box::new(ElasticSection::planar(2.0e6, 1.5e4).unwrap()) as Box<dyn SectionResponse>)
//!     .collect();
//!
//! let mut element = ForceBeamColumn::new(
//!     1,
//!     Box::new(transf),
//!     Box::new(Lobatto),
//!     sections,
//!     IterationOptions::default(),
//! )
//! .unwrap();
//!
//! // Rotate node j by 1 mrad
//! let mut u = nalgebra::DVector::zeros(6);
//! u[5] = 1.0e-3;
//! element.update(&u).unwrap();
//! element.commit_state().unwrap();
//!
//! let forces = element.resisting_force();
//! assert!(forces[5] > 0.0);
//! ```
//!
//! [`ForceBeamColumn`]: elements::ForceBeamColumn
//! [`SectionResponse`]: sections::SectionResponse
//! [`BeamIntegration`]: integration::BeamIntegration
//! [`CrdTransformation`]: transform::CrdTransformation

pub mod analysis;
pub mod elements;
pub mod error;
pub mod integration;
pub mod loads;
pub mod math;
pub mod sections;
pub mod transform;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{CompatibilityIterator, IterationMode, IterationOptions, IterationReport};
    pub use crate::elements::{
        ElementFamily, ElementState, ForceBeamColumn, Lifecycle, Node, ResponseCode, SectionSample,
    };
    pub use crate::error::{FlexError, FlexResult, SectionError};
    pub use crate::integration::{BeamIntegration, ElasticInterior, HingeMidpoint, Legendre, Lobatto};
    pub use crate::loads::ElementLoad;
    pub use crate::sections::{BilinearSection, ElasticSection, Material, SectionProperties, SectionResponse};
    pub use crate::transform::{CrdTransformation, LinearTransformation};
}
