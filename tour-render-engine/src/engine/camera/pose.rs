use bevy::math::{DMat3, DQuat, DVec3};
use bevy::prelude::*;

use crate::engine::scene::RenderOrigin;

/// Double precision camera placement. Rotation follows Bevy's camera
/// convention: local -Z is forward and local +Y is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl CameraPose {
    /// Camera at `position` looking along `forward` with `up` as the roll
    /// reference. `None` when `forward` is zero or parallel to `up`.
    pub fn look_to(position: DVec3, forward: DVec3, up: DVec3) -> Option<Self> {
        let back = -forward.try_normalize()?;
        let right = up.cross(back).try_normalize()?;
        let up = back.cross(right);
        Some(Self {
            position,
            rotation: DQuat::from_mat3(&DMat3::from_cols(right, up, back)),
        })
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::NEG_Z
    }

    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Single precision transform relative to the floating render origin.
    pub fn to_transform(&self, origin: &RenderOrigin) -> Transform {
        Transform {
            translation: origin.to_render(self.position),
            rotation: self.rotation.as_quat(),
            ..default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_to_matches_requested_axes() {
        let pose = CameraPose::look_to(DVec3::ONE, DVec3::X, DVec3::Z).unwrap();
        assert!(pose.forward().abs_diff_eq(DVec3::X, 1e-12));
        assert!(pose.up().abs_diff_eq(DVec3::Z, 1e-12));
        assert_eq!(pose.position, DVec3::ONE);
    }

    #[test]
    fn up_is_orthogonalised() {
        let pose = CameraPose::look_to(DVec3::ZERO, DVec3::X, DVec3::new(1.0, 0.0, 1.0)).unwrap();
        assert!(pose.up().abs_diff_eq(DVec3::Z, 1e-12));
    }

    #[test]
    fn degenerate_axes_are_rejected() {
        assert!(CameraPose::look_to(DVec3::ZERO, DVec3::ZERO, DVec3::Z).is_none());
        assert!(CameraPose::look_to(DVec3::ZERO, DVec3::Z, DVec3::Z).is_none());
    }
}
