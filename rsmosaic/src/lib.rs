pub mod collect;
pub mod commons;
pub mod errors;
pub mod geo_core;
pub mod mosaic;

pub use errors::GeometryError;
pub use geo_core::{BoundingBox, Footprint, Region};
pub use mosaic::coverage::{coverage, RunningUnion};
pub use mosaic::reduce::reduce;
