pub mod format;
pub mod model;
pub mod tracker;

pub use model::*;
pub use tracker::*;
