//! Geometry, state resolution and camera control for a spacecraft tour viewer.

pub mod engine;
