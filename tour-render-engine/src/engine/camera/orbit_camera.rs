use bevy::math::{DQuat, DVec2, DVec3};
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
    window::PrimaryWindow,
};
use constants::coordinate_system::WORLD_UP;
use constants::render_settings::INITIAL_CAMERA_POSITION;

use super::pose::CameraPose;
use crate::engine::frames::{FrameResolver, ParentMap};
use crate::engine::scene::RenderOrigin;
use crate::engine::settings::{GestureSettings, ViewerSettings};
use crate::engine::snapshot::catalog::BodyRadii;
use crate::engine::snapshot::loader::{CurrentSnapshot, SnapshotApplied};
use crate::engine::viewports::PrimaryView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dolly {
    In,
    Out,
}

/// Look-at target plus the camera's offset from it. The camera always sits at
/// `target + offset`; only gestures and binding ever change `offset`.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub target: DVec3,
    pub offset: DVec3,
    pub up: DVec3,
    pub bound: Option<String>,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::free(INITIAL_CAMERA_POSITION, DVec3::ZERO)
    }
}

impl CameraRig {
    /// Unbound rig at `position` looking at `target`.
    pub fn free(position: DVec3, target: DVec3) -> Self {
        Self {
            target,
            offset: position - target,
            up: WORLD_UP,
            bound: None,
        }
    }

    pub fn position(&self) -> DVec3 {
        self.target + self.offset
    }

    pub fn distance(&self) -> f64 {
        self.offset.length()
    }

    /// Binds the rig to `name` and frames it at `framing` times its
    /// characteristic radius. Leaves the rig untouched and returns `false`
    /// when the name does not resolve.
    pub fn bind(
        &mut self,
        name: &str,
        resolver: &FrameResolver,
        radius_au: f64,
        framing: DVec3,
    ) -> bool {
        let Some(target) = resolver.resolve(name) else {
            return false;
        };
        self.target = target;
        self.offset = framing * radius_au;
        self.up = WORLD_UP;
        self.bound = Some(name.to_string());
        self.level();
        true
    }

    pub fn unbind(&mut self) {
        self.bound = None;
    }

    /// Follows the bound body to its position in a new snapshot, keeping the
    /// offset. Returns `false` when unbound or the body no longer resolves,
    /// in which case the rig holds its last pose.
    pub fn refresh(&mut self, resolver: &FrameResolver) -> bool {
        let Some(target) = self
            .bound
            .as_deref()
            .and_then(|name| resolver.resolve(name))
        else {
            return false;
        };
        self.target = target;
        true
    }

    /// Scales the distance to the target by one wheel step, clamped to the
    /// configured range. A rig already outside the range is never pushed
    /// against the direction of the step.
    pub fn dolly(&mut self, dolly: Dolly, gestures: &GestureSettings) {
        let distance = self.distance();
        if !(distance > 0.0 && distance.is_finite()) {
            return;
        }
        let clamped = match dolly {
            Dolly::In => (distance * gestures.zoom_scale)
                .clamp(gestures.min_distance.min(distance), gestures.max_distance.min(distance)),
            Dolly::Out => (distance / gestures.zoom_scale)
                .clamp(gestures.min_distance.max(distance), gestures.max_distance.max(distance)),
        };
        self.offset *= clamped / distance;
    }

    /// One drag step. The dominant axis of `delta` (pixels) picks pitch about
    /// the camera's right axis or yaw about world up.
    pub fn orbit(&mut self, delta: DVec2, sensitivity: f64) {
        let Some(forward) = (-self.offset).try_normalize() else {
            return;
        };

        let (axis, angle) = if delta.y.abs() > delta.x.abs() {
            (forward.cross(self.up).try_normalize(), -delta.y * sensitivity)
        } else {
            (Some(WORLD_UP), delta.x * sensitivity)
        };
        let Some(axis) = axis else {
            return;
        };
        if angle == 0.0 {
            return;
        }

        self.offset = DQuat::from_axis_angle(axis, angle) * self.offset;
        self.level();
    }

    /// Removes roll: up becomes world up projected off the view direction.
    /// Looking straight along world up keeps the previous up vector.
    fn level(&mut self) {
        let Some(forward) = (-self.offset).try_normalize() else {
            return;
        };
        if let Some(up) = forward.cross(WORLD_UP).cross(forward).try_normalize() {
            self.up = up;
        }
    }

    pub fn pose(&self) -> Option<CameraPose> {
        let forward = -self.offset;
        CameraPose::look_to(self.position(), forward, self.up)
            .or_else(|| CameraPose::look_to(self.position(), forward, WORLD_UP))
            .or_else(|| CameraPose::look_to(self.position(), forward, DVec3::X))
    }
}

/// Request to bind the primary rig to a body (or the spacecraft).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ZoomRequest {
    pub name: String,
}

pub fn orbit_camera_input(
    mut rigs: Query<(&mut CameraRig, &Camera), With<PrimaryView>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<ViewerSettings>,
) {
    // Drain every frame so gestures outside the viewport do not pile up.
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scrolls: Vec<f32> = scroll_events.read().map(|ev| ev.y).collect();

    let Ok((mut rig, camera)) = rigs.single_mut() else {
        return;
    };
    let cursor_inside = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position())
        .zip(camera.logical_viewport_rect())
        .is_some_and(|(cursor, rect)| rect.contains(cursor));
    if !cursor_inside {
        return;
    }

    let gestures = settings.gestures();

    if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
        rig.orbit(mouse_delta.as_dvec2(), gestures.sensitivity);
    }

    // One dolly step per wheel event, direction from the scroll sign.
    for y in scrolls {
        if y > 0.0 {
            rig.dolly(Dolly::In, &gestures);
        } else if y < 0.0 {
            rig.dolly(Dolly::Out, &gestures);
        }
    }
}

pub fn handle_zoom_requests(
    mut requests: EventReader<ZoomRequest>,
    mut rigs: Query<&mut CameraRig, With<PrimaryView>>,
    current: Option<Res<CurrentSnapshot>>,
    parents: Res<ParentMap>,
    radii: Res<BodyRadii>,
    settings: Res<ViewerSettings>,
) {
    let Some(current) = current else {
        requests.clear();
        return;
    };
    let resolver = FrameResolver::new(&current.snapshot, &parents);

    for request in requests.read() {
        for mut rig in &mut rigs {
            let radius = radii.characteristic_radius_au(&request.name);
            if rig.bind(&request.name, &resolver, radius, settings.framing()) {
                info!(
                    "Camera bound to {} at {:.3e} AU",
                    request.name,
                    rig.distance()
                );
            } else {
                warn!("Cannot zoom to {}: not in the current snapshot", request.name);
            }
        }
    }
}

/// Moves bound rigs with their targets whenever a new snapshot lands.
pub fn refresh_bound_rigs(
    mut applied: EventReader<SnapshotApplied>,
    mut rigs: Query<&mut CameraRig>,
    current: Option<Res<CurrentSnapshot>>,
    parents: Res<ParentMap>,
) {
    if applied.read().last().is_none() {
        return;
    }
    let Some(current) = current else {
        return;
    };
    let resolver = FrameResolver::new(&current.snapshot, &parents);

    for mut rig in &mut rigs {
        if rig.bound.is_some() && !rig.refresh(&resolver) {
            debug!(
                "{:?} missing from snapshot #{}; camera holds its pose",
                rig.bound, current.sequence
            );
        }
    }
}

pub fn apply_orbit_camera_transforms(
    mut cameras: Query<(&CameraRig, &mut Transform)>,
    origin: Res<RenderOrigin>,
) {
    for (rig, mut transform) in &mut cameras {
        if let Some(pose) = rig.pose() {
            *transform = pose.to_transform(&origin);
        }
    }
}
