//! Static tables shared by the tour renderer: the body catalog, unit scales,
//! frame conventions and render tuning values.

/// Body catalog: parent relationships, display colours and encounter names.
pub mod bodies;

/// Frame conventions between telemetry, planetary frames and render meshes.
pub mod coordinate_system;

/// Camera, orbit path and overlay tuning values.
pub mod render_settings;
