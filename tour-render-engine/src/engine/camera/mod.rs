//! Camera controllers for the two viewports.
//!
//! The primary view orbits a look-at target under pointer control and keeps
//! its offset across snapshot refreshes. The secondary view is locked to the
//! spacecraft attitude and takes no input.

/// Attitude-locked secondary camera with selectable up-vector strategies.
pub mod locked_camera;

/// Offset-preserving orbit rig, its gestures and the systems driving it.
pub mod orbit_camera;

/// Double precision camera pose and look-to construction.
pub mod pose;
