//! The primary orbit view and the secondary locked view share one window.

use bevy::prelude::*;
use bevy::render::camera::Viewport;
use bevy::render::view::RenderLayers;
use bevy::window::PrimaryWindow;
use constants::render_settings::{CAMERA_NEAR_AU, SECONDARY_VIEWPORT_FRACTION};

use crate::engine::camera::locked_camera::LockedCamera;
use crate::engine::camera::orbit_camera::CameraRig;
use crate::engine::settings::ViewerSettings;

/// Render layer seen only by the primary view.
pub const PRIMARY_LAYER: usize = 1;
/// Render layer seen only by the secondary view.
pub const SECONDARY_LAYER: usize = 2;

const CAMERA_FAR_AU: f32 = 1.0e6;

#[derive(Component)]
pub struct PrimaryView;

#[derive(Component)]
pub struct SecondaryView;

/// Physical pixel rectangle of one viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportRect {
    pub position: UVec2,
    pub size: UVec2,
}

/// Splits a window into the primary area on the left and a secondary column
/// on the right taking `fraction` of the width. Both are at least one pixel.
pub fn split_viewports(width: u32, height: u32, fraction: f32) -> (ViewportRect, ViewportRect) {
    let width = width.max(2);
    let height = height.max(1);
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        SECONDARY_VIEWPORT_FRACTION
    };

    let secondary_width = ((width as f32 * fraction).round() as u32).clamp(1, width - 1);
    let primary_width = width - secondary_width;

    (
        ViewportRect {
            position: UVec2::ZERO,
            size: UVec2::new(primary_width, height),
        },
        ViewportRect {
            position: UVec2::new(primary_width, 0),
            size: UVec2::new(secondary_width, height),
        },
    )
}

fn perspective(fov: f32) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov,
        near: CAMERA_NEAR_AU,
        far: CAMERA_FAR_AU,
        ..default()
    })
}

pub fn spawn_viewports(mut commands: Commands, settings: Res<ViewerSettings>) {
    commands.spawn((
        Camera3d::default(),
        Camera {
            order: 0,
            ..default()
        },
        perspective(settings.primary_fov_radians()),
        Transform::default(),
        CameraRig::default(),
        RenderLayers::from_layers(&[0, PRIMARY_LAYER]),
        PrimaryView,
        Name::new("Primary view"),
    ));

    commands.spawn((
        Camera3d::default(),
        Camera {
            order: 1,
            ..default()
        },
        perspective(settings.secondary_fov_radians()),
        Transform::default(),
        LockedCamera::default(),
        RenderLayers::from_layers(&[0, SECONDARY_LAYER]),
        SecondaryView,
        Name::new("Locked view"),
    ));
    info!("✓ Primary and locked viewports spawned");
}

/// Keeps both viewports matched to the window's physical size.
pub fn update_viewport_layout(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut primary: Query<&mut Camera, (With<PrimaryView>, Without<SecondaryView>)>,
    mut secondary: Query<&mut Camera, (With<SecondaryView>, Without<PrimaryView>)>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (primary_rect, secondary_rect) = split_viewports(
        window.physical_width(),
        window.physical_height(),
        SECONDARY_VIEWPORT_FRACTION,
    );

    if let Ok(mut camera) = primary.single_mut() {
        set_viewport(&mut camera, primary_rect);
    }
    if let Ok(mut camera) = secondary.single_mut() {
        set_viewport(&mut camera, secondary_rect);
    }
}

fn set_viewport(camera: &mut Camera, rect: ViewportRect) {
    let unchanged = camera.viewport.as_ref().is_some_and(|viewport| {
        viewport.physical_position == rect.position && viewport.physical_size == rect.size
    });
    if !unchanged {
        camera.viewport = Some(Viewport {
            physical_position: rect.position,
            physical_size: rect.size,
            ..default()
        });
    }
}

/// Re-applies the configured vertical FOV whenever settings change.
pub fn apply_fov_settings(
    settings: Res<ViewerSettings>,
    mut primary: Query<&mut Projection, (With<PrimaryView>, Without<SecondaryView>)>,
    mut secondary: Query<&mut Projection, (With<SecondaryView>, Without<PrimaryView>)>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut projection in &mut primary {
        *projection = perspective(settings.primary_fov_radians());
    }
    for mut projection in &mut secondary {
        *projection = perspective(settings.secondary_fov_radians());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_covers_the_window_without_overlap() {
        let (primary, secondary) = split_viewports(1600, 900, 0.35);
        assert_eq!(primary.position, UVec2::ZERO);
        assert_eq!(primary.size, UVec2::new(1040, 900));
        assert_eq!(secondary.position, UVec2::new(1040, 0));
        assert_eq!(secondary.size, UVec2::new(560, 900));
    }

    #[test]
    fn degenerate_windows_keep_both_views() {
        for (width, height, fraction) in [(0, 0, 0.35), (10, 10, 0.0), (10, 10, 1.0), (10, 10, f32::NAN)] {
            let (primary, secondary) = split_viewports(width, height, fraction);
            assert!(primary.size.x >= 1 && primary.size.y >= 1);
            assert!(secondary.size.x >= 1 && secondary.size.y >= 1);
            assert_eq!(primary.size.x + secondary.size.x, width.max(2));
        }
    }
}
