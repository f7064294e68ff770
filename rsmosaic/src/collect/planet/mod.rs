pub mod filters;
pub mod planet_collect;

pub use planet_collect::PlanetCollect;
