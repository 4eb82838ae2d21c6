mod scene_data;

pub use scene_data::*;
