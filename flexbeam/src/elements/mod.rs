//! Force-based frame element and the per-point section state it carries

mod force_beam;
mod node;
mod response;
mod sample;

pub use force_beam::{ElementState, ForceBeamColumn, Lifecycle};
pub use node::Node;
pub use response::{ElementFamily, ResponseCode};
pub use sample::{SectionSample, SectionStore};
