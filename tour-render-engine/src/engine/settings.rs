use bevy::math::DVec3;
use bevy::prelude::*;
use constants::render_settings::{
    DEFAULT_FRAMING, LOCKED_OVERLAY_DISTANCE_AU, MAX_CAMERA_DISTANCE_AU, MAX_FOV_DEGREES,
    MIN_CAMERA_DISTANCE_AU, MIN_FOV_DEGREES, ORBIT_SENSITIVITY, OVERLAY_DISTANCE_FRACTION,
    PRIMARY_FOV_DEGREES, SECONDARY_FOV_DEGREES, WHEEL_ZOOM_SCALE,
};
use serde::{Deserialize, Serialize};

use crate::engine::camera::locked_camera::LockedStrategy;
use crate::engine::fov_overlay::OverlayMode;

/// Run-time viewer configuration. Every field is optional in the JSON file;
/// omitted fields keep their defaults.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerSettings {
    pub locked_strategy: LockedStrategy,
    pub orbit_sensitivity: f64,
    pub wheel_zoom_scale: f64,
    pub min_distance_au: f64,
    pub max_distance_au: f64,
    /// Camera offset on binding, in multiples of the target radius.
    pub framing: [f64; 3],
    pub primary_fov_deg: f32,
    pub secondary_fov_deg: f32,
    /// Primary overlay distance as a fraction of the camera-to-target distance.
    pub overlay_distance_fraction: f64,
    pub locked_overlay_distance_au: f64,
    pub primary_overlay_mode: OverlayMode,
    pub secondary_overlay_mode: OverlayMode,
    pub show_primary_overlays: bool,
    pub show_secondary_overlays: bool,
    /// Epoch to load once the settings file arrives.
    pub initial_epoch: Option<String>,
    /// Body the primary camera binds to when the first snapshot lands.
    pub initial_target: Option<String>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            locked_strategy: LockedStrategy::default(),
            orbit_sensitivity: ORBIT_SENSITIVITY,
            wheel_zoom_scale: WHEEL_ZOOM_SCALE,
            min_distance_au: MIN_CAMERA_DISTANCE_AU,
            max_distance_au: MAX_CAMERA_DISTANCE_AU,
            framing: DEFAULT_FRAMING.to_array(),
            primary_fov_deg: PRIMARY_FOV_DEGREES,
            secondary_fov_deg: SECONDARY_FOV_DEGREES,
            overlay_distance_fraction: OVERLAY_DISTANCE_FRACTION,
            locked_overlay_distance_au: LOCKED_OVERLAY_DISTANCE_AU,
            primary_overlay_mode: OverlayMode::CameraRelative,
            secondary_overlay_mode: OverlayMode::AttitudeRelative,
            show_primary_overlays: false,
            show_secondary_overlays: true,
            initial_epoch: None,
            initial_target: Some(constants::bodies::SPACECRAFT_NAME.to_string()),
        }
    }
}

/// Gesture tuning with ranges already sanitised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    pub sensitivity: f64,
    /// Distance multiplier per zoom-in step, in `(0, 1)`.
    pub zoom_scale: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl ViewerSettings {
    /// Gesture values with out-of-range entries replaced by defaults so
    /// dolly and orbit never see an inverted or empty distance range.
    pub fn gestures(&self) -> GestureSettings {
        let sensitivity = positive_or(self.orbit_sensitivity, ORBIT_SENSITIVITY);
        let zoom_scale = if self.wheel_zoom_scale > 0.0 && self.wheel_zoom_scale < 1.0 {
            self.wheel_zoom_scale
        } else {
            WHEEL_ZOOM_SCALE
        };
        let (min_distance, max_distance) = if self.min_distance_au > 0.0
            && self.max_distance_au.is_finite()
            && self.min_distance_au < self.max_distance_au
        {
            (self.min_distance_au, self.max_distance_au)
        } else {
            (MIN_CAMERA_DISTANCE_AU, MAX_CAMERA_DISTANCE_AU)
        };

        GestureSettings {
            sensitivity,
            zoom_scale,
            min_distance,
            max_distance,
        }
    }

    pub fn framing(&self) -> DVec3 {
        let framing = DVec3::from_array(self.framing);
        if framing.is_finite() && framing.length_squared() > 0.0 {
            framing
        } else {
            DEFAULT_FRAMING
        }
    }

    pub fn primary_fov_radians(&self) -> f32 {
        clamp_fov(self.primary_fov_deg).to_radians()
    }

    pub fn secondary_fov_radians(&self) -> f32 {
        clamp_fov(self.secondary_fov_deg).to_radians()
    }

    pub fn overlay_distance_fraction(&self) -> f64 {
        positive_or(self.overlay_distance_fraction, OVERLAY_DISTANCE_FRACTION)
    }

    pub fn locked_overlay_distance(&self) -> f64 {
        positive_or(self.locked_overlay_distance_au, LOCKED_OVERLAY_DISTANCE_AU)
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        value
    } else {
        default
    }
}

fn clamp_fov(degrees: f32) -> f32 {
    if degrees.is_finite() {
        degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
    } else {
        PRIMARY_FOV_DEGREES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: ViewerSettings =
            serde_json::from_str(r#"{"lockedStrategy": "rollAngle", "primaryFovDeg": 70}"#)
                .unwrap();
        assert_eq!(settings.locked_strategy, LockedStrategy::RollAngle);
        assert_eq!(settings.primary_fov_deg, 70.0);
        assert_eq!(settings.secondary_fov_deg, SECONDARY_FOV_DEGREES);
        assert_eq!(settings.secondary_overlay_mode, OverlayMode::AttitudeRelative);
        assert_eq!(settings.gestures().zoom_scale, WHEEL_ZOOM_SCALE);
    }

    #[test]
    fn invalid_ranges_fall_back() {
        let settings = ViewerSettings {
            wheel_zoom_scale: 1.5,
            min_distance_au: 10.0,
            max_distance_au: 1.0,
            orbit_sensitivity: f64::NAN,
            framing: [0.0; 3],
            primary_fov_deg: 400.0,
            ..default()
        };
        let gestures = settings.gestures();
        assert_eq!(gestures.zoom_scale, WHEEL_ZOOM_SCALE);
        assert_eq!(gestures.min_distance, MIN_CAMERA_DISTANCE_AU);
        assert_eq!(gestures.max_distance, MAX_CAMERA_DISTANCE_AU);
        assert_eq!(gestures.sensitivity, ORBIT_SENSITIVITY);
        assert_eq!(settings.framing(), DEFAULT_FRAMING);
        assert_eq!(settings.primary_fov_radians(), MAX_FOV_DEGREES.to_radians());
    }
}
