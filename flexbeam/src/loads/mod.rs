//! Element loads

mod element_load;

pub use element_load::ElementLoad;
