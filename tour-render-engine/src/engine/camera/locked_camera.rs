use bevy::math::{DQuat, DVec3, EulerRot};
use bevy::prelude::*;
use constants::bodies::FALLBACK_LOOK_TARGET;
use constants::coordinate_system::{
    SPACECRAFT_BORESIGHT, SPACECRAFT_UP, WORLD_UP, telemetry_to_render,
};
use serde::{Deserialize, Serialize};

use super::pose::CameraPose;
use crate::engine::frames::{FrameResolver, ParentMap};
use crate::engine::scene::RenderOrigin;
use crate::engine::settings::ViewerSettings;
use crate::engine::snapshot::loader::CurrentSnapshot;
use crate::engine::snapshot::model::decode_attitude;
use crate::engine::viewports::SecondaryView;

/// How the locked view derives its up vector from the spacecraft attitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LockedStrategy {
    /// Up is the body +Z axis, boresight the body +Y axis.
    #[default]
    BodyAxes,
    /// Up is world up leveled against the boresight, then rolled by the
    /// attitude's roll about the boresight.
    RollAngle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Attitude,
    Fallback,
}

/// Pose of the locked camera for one frame and how it was derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockedView {
    pub pose: CameraPose,
    pub mode: LockMode,
    /// Spacecraft body-to-world rotation, when attitude data is present.
    pub body_to_world: Option<DQuat>,
}

/// State of the secondary camera, rewritten every frame.
#[derive(Component, Debug, Clone, Default)]
pub struct LockedCamera {
    pub view: Option<LockedView>,
}

/// Pose from the spacecraft position and its reported attitude. Missing,
/// identity and degenerate attitudes select the fallback pose.
pub fn locked_view(
    strategy: LockedStrategy,
    position: DVec3,
    reported: Option<DQuat>,
    fallback_target: DVec3,
) -> LockedView {
    if let Some(reported) = reported.and_then(|q| decode_attitude(Some(q.to_array()))) {
        let body_to_world = telemetry_to_render(reported);
        let boresight = body_to_world * SPACECRAFT_BORESIGHT;
        let up = match strategy {
            LockedStrategy::BodyAxes => Some(body_to_world * SPACECRAFT_UP),
            LockedStrategy::RollAngle => rolled_up(body_to_world, boresight),
        };

        if let Some(pose) = up.and_then(|up| CameraPose::look_to(position, boresight, up)) {
            return LockedView {
                pose,
                mode: LockMode::Attitude,
                body_to_world: Some(body_to_world),
            };
        }
    }

    LockedView {
        pose: fallback_pose(position, fallback_target),
        mode: LockMode::Fallback,
        body_to_world: None,
    }
}

/// World up projected off the boresight, rotated about the boresight by the
/// attitude's intrinsic roll (Z-X-Y order, last angle).
fn rolled_up(body_to_world: DQuat, boresight: DVec3) -> Option<DVec3> {
    let leveled = leveled_against(boresight, WORLD_UP)
        .or_else(|| leveled_against(boresight, DVec3::X))?;
    let (_, _, roll) = body_to_world.to_euler(EulerRot::ZXY);
    Some(DQuat::from_axis_angle(boresight, roll) * leveled)
}

fn leveled_against(forward: DVec3, reference: DVec3) -> Option<DVec3> {
    forward.cross(reference).cross(forward).try_normalize()
}

/// World-up camera aimed at `target`. Never fails: a target at the camera
/// position falls back to looking along world +Y.
fn fallback_pose(position: DVec3, target: DVec3) -> CameraPose {
    CameraPose::look_to(position, target - position, WORLD_UP)
        .or_else(|| CameraPose::look_to(position, DVec3::Y, WORLD_UP))
        .unwrap_or(CameraPose {
            position,
            rotation: DQuat::IDENTITY,
        })
}

pub fn update_locked_camera(
    mut cameras: Query<(&mut LockedCamera, &mut Transform), With<SecondaryView>>,
    current: Option<Res<CurrentSnapshot>>,
    parents: Res<ParentMap>,
    settings: Res<ViewerSettings>,
    origin: Res<RenderOrigin>,
    mut last_mode: Local<Option<LockMode>>,
) {
    let Some(current) = current else {
        return;
    };
    let resolver = FrameResolver::new(&current.snapshot, &parents);
    let fallback_target = resolver.resolve(FALLBACK_LOOK_TARGET).unwrap_or(DVec3::ZERO);

    let view = locked_view(
        settings.locked_strategy,
        resolver.spacecraft_position(),
        current.snapshot.spacecraft.bus_attitude(),
        fallback_target,
    );

    if *last_mode != Some(view.mode) {
        match view.mode {
            LockMode::Attitude => info!("Locked view following spacecraft attitude"),
            LockMode::Fallback => {
                warn!("No spacecraft attitude; locked view aims at {}", FALLBACK_LOOK_TARGET)
            }
        }
        *last_mode = Some(view.mode);
    }

    for (mut locked, mut transform) in &mut cameras {
        *transform = view.pose.to_transform(&origin);
        locked.view = Some(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const POSITION: DVec3 = DVec3::new(5.0, 0.2, -0.1);

    #[test]
    fn missing_attitude_looks_at_fallback_target() {
        let target = DVec3::new(5.0, 1.2, -0.1);
        for strategy in [LockedStrategy::BodyAxes, LockedStrategy::RollAngle] {
            let view = locked_view(strategy, POSITION, None, target);
            assert_eq!(view.mode, LockMode::Fallback);
            assert!(view.pose.forward().abs_diff_eq(DVec3::Y, 1e-12));
            assert!(view.pose.up().abs_diff_eq(WORLD_UP, 1e-12));
            assert_eq!(view.pose.position, POSITION);
            assert!(view.body_to_world.is_none());
        }
    }

    #[test]
    fn identity_attitude_is_treated_as_missing() {
        let target = DVec3::new(6.0, 0.2, -0.1);
        for identity in [DQuat::IDENTITY, -DQuat::IDENTITY] {
            let view = locked_view(LockedStrategy::BodyAxes, POSITION, Some(identity), target);
            assert_eq!(view.mode, LockMode::Fallback);
            assert!(view.pose.forward().abs_diff_eq(DVec3::X, 1e-12));
        }
    }

    #[test]
    fn fallback_target_at_camera_is_still_defined() {
        let view = locked_view(LockedStrategy::BodyAxes, POSITION, None, POSITION);
        assert_eq!(view.mode, LockMode::Fallback);
        assert!(view.pose.rotation.is_finite());
        assert!(view.pose.forward().abs_diff_eq(DVec3::Y, 1e-12));
    }

    #[test]
    fn body_axes_follow_inverted_attitude() {
        // Reported +90° about Z means the body is turned -90° about Z in world.
        let reported = DQuat::from_rotation_z(FRAC_PI_2);
        let view = locked_view(LockedStrategy::BodyAxes, POSITION, Some(reported), DVec3::ZERO);

        assert_eq!(view.mode, LockMode::Attitude);
        assert!(view.pose.forward().abs_diff_eq(DVec3::X, 1e-12));
        assert!(view.pose.up().abs_diff_eq(DVec3::Z, 1e-12));
        assert_eq!(view.pose.position, POSITION);
    }

    #[test]
    fn roll_angle_handles_boresight_along_world_up() {
        // Body +Y maps onto world +Z.
        let reported = DQuat::from_rotation_x(-FRAC_PI_2);
        let view = locked_view(LockedStrategy::RollAngle, POSITION, Some(reported), DVec3::ZERO);
        assert_eq!(view.mode, LockMode::Attitude);
        assert!(view.pose.forward().abs_diff_eq(DVec3::Z, 1e-12));
        assert!(view.pose.rotation.is_finite());
    }

    proptest! {
        #[test]
        fn strategies_agree_below_ninety_degrees_of_pitch(
            yaw in -3.0f64..3.0,
            pitch in -1.4f64..1.4,
            roll in -3.0f64..3.0,
        ) {
            let body_to_world = DQuat::from_euler(EulerRot::ZXY, yaw, pitch, roll);
            let reported = body_to_world.inverse();
            let axes = locked_view(LockedStrategy::BodyAxes, POSITION, Some(reported), DVec3::ZERO);
            let rolled = locked_view(LockedStrategy::RollAngle, POSITION, Some(reported), DVec3::ZERO);

            prop_assert!(axes.pose.forward().abs_diff_eq(rolled.pose.forward(), 1e-9));
            prop_assert!(axes.pose.up().abs_diff_eq(rolled.pose.up(), 1e-6));
        }
    }
}
