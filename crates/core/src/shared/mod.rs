pub mod asset_resolver;
pub mod bounding_box;
pub mod constants;
pub mod frame;
