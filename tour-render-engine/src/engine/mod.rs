pub mod articulation;
pub mod camera;
pub mod core;
pub mod fov_overlay;
pub mod frames;
pub mod orbits;
pub mod scene;
pub mod settings;
pub mod snapshot;
pub mod viewports;
