use bevy::math::DVec3;

use crate::bodies::KM_PER_AU;

/// Samples per orbit ring. The ring holds `ORBIT_SAMPLES + 1` points so it closes.
pub const ORBIT_SAMPLES: usize = 1024;

/// Fraction of the ring the bright band leads the body by.
pub const ORBIT_LEAD_FRACTION: f64 = 0.005;

/// Eccentricities at or above this are treated as open conics and not sampled.
pub const MAX_SAMPLED_ECCENTRICITY: f64 = 1.0;

/// Denominators of the conic equation below this are treated as singular.
pub const MIN_CONIC_DENOMINATOR: f64 = 1e-9;

/// Camera-to-target offset, in multiples of the target radius, used on binding.
pub const DEFAULT_FRAMING: DVec3 = DVec3::new(10.0, -10.0, 10.0);

/// Characteristic radius used when a body's size is unknown (1 km).
pub const FALLBACK_RADIUS_AU: f64 = 1.0 / KM_PER_AU;

/// Radians of orbit rotation per pixel of pointer drag.
pub const ORBIT_SENSITIVITY: f64 = 0.005;

/// Multiplicative distance step per wheel notch.
pub const WHEEL_ZOOM_SCALE: f64 = 0.95;

pub const MIN_CAMERA_DISTANCE_AU: f64 = 1e-12;
pub const MAX_CAMERA_DISTANCE_AU: f64 = 100.0;

/// Initial free camera placement before any target is bound.
pub const INITIAL_CAMERA_POSITION: DVec3 = DVec3::new(10.0, 0.0, 5.0);

pub const PRIMARY_FOV_DEGREES: f32 = 50.0;
pub const SECONDARY_FOV_DEGREES: f32 = 50.0;
pub const MIN_FOV_DEGREES: f32 = 10.0;
pub const MAX_FOV_DEGREES: f32 = 120.0;

pub const CAMERA_NEAR_AU: f32 = 1e-14;

/// Overlay rectangles sit this fraction of the camera-to-target distance in front of the camera.
pub const OVERLAY_DISTANCE_FRACTION: f64 = 0.01;

/// Overlay distance used by the locked view, which has no target distance.
pub const LOCKED_OVERLAY_DISTANCE_AU: f64 = 1e-12;

/// Fraction of the window width taken by the secondary (locked) viewport.
pub const SECONDARY_VIEWPORT_FRACTION: f32 = 0.35;

/// Spacecraft model units to AU.
pub const SPACECRAFT_MODEL_SCALE: f64 = 35.47 / 1e3 / KM_PER_AU;

/// Solar array hinge pivot in bus model units, along the bus +Z axis.
pub const ARRAY_HINGE_OFFSET: DVec3 = DVec3::new(0.0, 0.0, 1.7388);

/// Length of the direction cue arrows drawn from the spacecraft, in AU.
pub const DIRECTION_CUE_LENGTH_AU: f64 = 5.0 * SPACECRAFT_MODEL_SCALE;
