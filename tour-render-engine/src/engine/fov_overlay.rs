//! Instrument field-of-view rectangles drawn just in front of each camera.

use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::math::{DMat3, DQuat, DVec3};
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use constants::coordinate_system::SPACECRAFT_UP;
use serde::{Deserialize, Serialize};

use crate::engine::camera::locked_camera::LockedCamera;
use crate::engine::camera::orbit_camera::CameraRig;
use crate::engine::scene::RenderOrigin;
use crate::engine::settings::ViewerSettings;
use crate::engine::viewports::{PRIMARY_LAYER, PrimaryView, SECONDARY_LAYER};

/// Frames of the primary remote-sensing instruments; other catalog entries
/// are not drawn.
pub const PRIMARY_INSTRUMENT_FRAMES: &[&str] = &[
    "EUROPAM_EIS_NAC",
    "EUROPAM_EIS_WAC",
    "EUROPAM_ETHEMIS",
    "EUROPAM_UVS_AP",
    "EUROPAM_UVS_SP",
    "EUROPAM_REASON",
    "EUROPAM_MISE",
];

const DEFAULT_OVERLAY_COLOUR: [f32; 3] = [0.0, 1.0, 0.0];

fn default_colour() -> [f32; 3] {
    DEFAULT_OVERLAY_COLOUR
}

/// Angular aperture of one instrument in its boresight frame (+Y along the
/// boresight, +Z up). Angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentFov {
    pub name: String,
    pub frame: String,
    pub angular_width_deg: f64,
    /// Cross-track extent; square apertures omit it.
    #[serde(default)]
    pub angular_height_deg: Option<f64>,
    #[serde(default)]
    pub angular_offset_x_deg: f64,
    #[serde(default)]
    pub angular_offset_z_deg: f64,
    #[serde(default)]
    pub calibration_error_x_deg: f64,
    #[serde(default)]
    pub calibration_error_z_deg: f64,
    #[serde(default)]
    pub roll_y_deg: f64,
    #[serde(default = "default_colour")]
    pub colour: [f32; 3],
}

impl InstrumentFov {
    pub fn is_primary(&self) -> bool {
        PRIMARY_INSTRUMENT_FRAMES.contains(&self.frame.as_str())
    }

    /// Closed rectangle `distance` ahead along the boresight, in the
    /// instrument frame. `None` if any corner is not finite.
    pub fn outline(&self, distance: f64) -> Option<[DVec3; 5]> {
        let z = distance.abs();
        let width = self.angular_width_deg.to_radians();
        let height = self
            .angular_height_deg
            .unwrap_or(self.angular_width_deg)
            .to_radians();

        let half_width = (width / 2.0).tan() * z;
        let half_height = (height / 2.0).tan() * z;
        let shift_x =
            (self.angular_offset_x_deg + self.calibration_error_x_deg).to_radians().tan() * z;
        let shift_z =
            (self.angular_offset_z_deg + self.calibration_error_z_deg).to_radians().tan() * z;
        let roll = DQuat::from_rotation_y(self.roll_y_deg.to_radians());

        let corner = |sx: f64, sz: f64| {
            roll * DVec3::new(sx * half_width + shift_x, z, sz * half_height + shift_z)
        };
        let outline = [
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
            corner(-1.0, -1.0),
        ];

        outline.iter().all(|p| p.is_finite()).then_some(outline)
    }
}

#[derive(Asset, TypePath, Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentCatalog {
    pub instruments: Vec<InstrumentFov>,
}

impl InstrumentCatalog {
    pub fn primary(&self) -> impl Iterator<Item = &InstrumentFov> {
        self.instruments.iter().filter(|fov| fov.is_primary())
    }
}

/// What an overlay's orientation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayMode {
    /// Fixed to the camera: the boresight is the view direction.
    CameraRelative,
    /// Along the view direction, rolled to match the spacecraft up axis.
    AttitudeRelative,
}

/// Instrument frame (+Y forward, +Z up) to camera frame (-Z forward, +Y up).
pub fn boresight_to_camera() -> DQuat {
    DQuat::from_rotation_x(-std::f64::consts::FRAC_PI_2)
}

/// Rotation taking instrument-frame outlines into world space. Both modes
/// put the boresight along the camera forward. Attitude mode takes the roll
/// about it from the spacecraft up axis, and degrades to camera-relative
/// without attitude data or when that axis lines up with the camera.
pub fn overlay_rotation(
    mode: OverlayMode,
    camera_rotation: DQuat,
    body_to_world: Option<DQuat>,
) -> DQuat {
    let camera_relative = camera_rotation * boresight_to_camera();
    if mode == OverlayMode::CameraRelative {
        return camera_relative;
    }

    let forward = camera_rotation * DVec3::NEG_Z;
    body_to_world
        .and_then(|body_to_world| boresight_frame(forward, body_to_world * SPACECRAFT_UP))
        .unwrap_or(camera_relative)
}

/// Instrument frame with +Y along `forward` and +Z as close to `up` as the
/// boresight allows.
fn boresight_frame(forward: DVec3, up: DVec3) -> Option<DQuat> {
    let forward = forward.try_normalize()?;
    let up = up.reject_from_normalized(forward).try_normalize()?;
    let right = forward.cross(up);
    Some(DQuat::from_mat3(&DMat3::from_cols(right, forward, up)))
}

/// World-space outline anchored at the camera position.
pub fn project(outline: &[DVec3; 5], camera_position: DVec3, rotation: DQuat) -> [DVec3; 5] {
    outline.map(|p| camera_position + rotation * p)
}

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct PrimaryOverlayGizmos;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct SecondaryOverlayGizmos;

/// Overlays are only visible to their own viewport and draw over the scene.
pub fn configure_overlay_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (primary, _) = config_store.config_mut::<PrimaryOverlayGizmos>();
    primary.render_layers = RenderLayers::layer(PRIMARY_LAYER);
    primary.depth_bias = -1.0;

    let (secondary, _) = config_store.config_mut::<SecondaryOverlayGizmos>();
    secondary.render_layers = RenderLayers::layer(SECONDARY_LAYER);
    secondary.depth_bias = -1.0;
}

fn draw_outlines<G: GizmoConfigGroup>(
    gizmos: &mut Gizmos<G>,
    catalog: &InstrumentCatalog,
    distance: f64,
    camera_position: DVec3,
    rotation: DQuat,
    origin: &RenderOrigin,
) {
    for fov in catalog.primary() {
        let Some(outline) = fov.outline(distance) else {
            warn_once!("Skipping FOV with non-finite outline: {}", fov.name);
            continue;
        };
        let [r, g, b] = fov.colour;
        gizmos.linestrip(
            project(&outline, camera_position, rotation)
                .into_iter()
                .map(|p| origin.to_render(p)),
            Color::srgb(r, g, b),
        );
    }
}

pub fn draw_primary_overlays(
    mut gizmos: Gizmos<PrimaryOverlayGizmos>,
    rigs: Query<&CameraRig, With<PrimaryView>>,
    locked: Query<&LockedCamera>,
    catalog: Res<InstrumentCatalog>,
    settings: Res<ViewerSettings>,
    origin: Res<RenderOrigin>,
) {
    if !settings.show_primary_overlays {
        return;
    }
    let Ok(rig) = rigs.single() else {
        return;
    };
    let Some(pose) = rig.pose() else {
        return;
    };

    let body_to_world = locked
        .iter()
        .find_map(|camera| camera.view.and_then(|view| view.body_to_world));
    let rotation = overlay_rotation(settings.primary_overlay_mode, pose.rotation, body_to_world);
    let distance = rig.distance() * settings.overlay_distance_fraction();

    draw_outlines(&mut gizmos, &catalog, distance, pose.position, rotation, &origin);
}

pub fn draw_secondary_overlays(
    mut gizmos: Gizmos<SecondaryOverlayGizmos>,
    locked: Query<&LockedCamera>,
    catalog: Res<InstrumentCatalog>,
    settings: Res<ViewerSettings>,
    origin: Res<RenderOrigin>,
) {
    if !settings.show_secondary_overlays {
        return;
    }
    let Some(view) = locked.iter().find_map(|camera| camera.view) else {
        return;
    };

    let rotation = overlay_rotation(
        settings.secondary_overlay_mode,
        view.pose.rotation,
        view.body_to_world,
    );
    draw_outlines(
        &mut gizmos,
        &catalog,
        settings.locked_overlay_distance(),
        view.pose.position,
        rotation,
        &origin,
    );
}
