pub mod coverage;
pub mod reduce;
pub mod scene_list;
