pub mod detection;
pub mod overlay_config;
pub mod palette;
pub mod pipeline;
pub mod scene;
pub mod systems;
pub mod tether_interface;

pub type Point3D = (f32, f32, f32);
