use bevy::math::{DQuat, DVec3};

/// World "up" for the ecliptic frame the scene is expressed in.
pub const WORLD_UP: DVec3 = DVec3::Z;

/// Sphere meshes have their poles on +Y; planetary body frames have them on +Z.
/// +90° about X maps mesh +Y onto body +Z.
pub fn mesh_pole_fix() -> DQuat {
    DQuat::from_rotation_x(std::f64::consts::FRAC_PI_2)
}

/// Spacecraft attitude telemetry is reported as the world-to-body rotation,
/// the inverse of the body-to-world rotation the renderer composes with.
pub fn telemetry_to_render(reported: DQuat) -> DQuat {
    reported.inverse()
}

/// Spacecraft body axis along which instruments and the locked camera look.
pub const SPACECRAFT_BORESIGHT: DVec3 = DVec3::Y;

/// Spacecraft body axis used as "up" by the locked camera.
pub const SPACECRAFT_UP: DVec3 = DVec3::Z;
