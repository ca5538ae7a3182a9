//! Bus and solar array attitude decomposition.
//!
//! Telemetry reports both rigid bodies in world frame with the opposite
//! handedness to the renderer. Both are inverted, then the array is expressed
//! relative to the bus so it can be parented to the bus about its hinge.

use bevy::math::{DQuat, DVec3};
use constants::coordinate_system::telemetry_to_render;
use constants::render_settings::ARRAY_HINGE_OFFSET;

/// Bus world orientation plus the array's hinge rotation relative to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HingeDecomposition {
    pub bus_world_attitude: DQuat,
    pub array_local_attitude: DQuat,
}

impl Default for HingeDecomposition {
    fn default() -> Self {
        Self {
            bus_world_attitude: DQuat::IDENTITY,
            array_local_attitude: DQuat::IDENTITY,
        }
    }
}

impl HingeDecomposition {
    /// Array world orientation recovered from the decomposition.
    pub fn array_world_attitude(&self) -> DQuat {
        self.bus_world_attitude * self.array_local_attitude
    }

    /// Array placement in the spacecraft root frame: the hinge pivot offset is
    /// rotated with the bus before the hinge rotation applies.
    pub fn array_pose(&self) -> (DVec3, DQuat) {
        (
            self.bus_world_attitude * ARRAY_HINGE_OFFSET,
            self.array_world_attitude(),
        )
    }
}

/// Splits reported bus and array attitudes into bus-world and array-local
/// rotations. Missing attitudes count as identity.
pub fn decompose(bus_reported: Option<DQuat>, array_reported: Option<DQuat>) -> HingeDecomposition {
    let bus_world = telemetry_to_render(bus_reported.unwrap_or(DQuat::IDENTITY));
    let array_world = telemetry_to_render(array_reported.unwrap_or(DQuat::IDENTITY));

    HingeDecomposition {
        bus_world_attitude: bus_world,
        array_local_attitude: (bus_world.inverse() * array_world).normalize(),
    }
}
