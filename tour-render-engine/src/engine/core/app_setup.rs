use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::camera::locked_camera::update_locked_camera;
use crate::engine::camera::orbit_camera::{
    ZoomRequest, apply_orbit_camera_transforms, handle_zoom_requests, orbit_camera_input,
    refresh_bound_rigs,
};
use crate::engine::fov_overlay::{
    InstrumentCatalog, PrimaryOverlayGizmos, SecondaryOverlayGizmos, configure_overlay_gizmos,
    draw_primary_overlays, draw_secondary_overlays,
};
use crate::engine::frames::ParentMap;
use crate::engine::scene::{
    RenderOrigin,
    bodies::{place_bodies, sync_bodies},
    orbit_lines::{place_orbit_lines, rebuild_orbit_lines},
    spacecraft::{draw_direction_cues, spawn_spacecraft, update_spacecraft},
    stars::{place_star_field, rebuild_star_field},
    update_render_origin,
};
use crate::engine::settings::ViewerSettings;
use crate::engine::snapshot::{
    catalog::BodyRadii,
    encounters::EncounterCatalog,
    loader::{
        CatalogLoader, EpochCommand, SnapshotApplied, SnapshotRequests, follow_settings_epoch,
        handle_epoch_commands, install_loaded, publish_loaded_snapshot, start_loading,
    },
    model::Snapshot,
};
use crate::engine::viewports::{apply_fov_settings, spawn_viewports, update_viewport_layout};
// Core
use crate::engine::core::app_state::{AppState, transition_to_running, zoom_to_initial_target};
use crate::engine::core::shortcuts::{
    handle_camera_shortcuts, handle_epoch_shortcuts, handle_view_shortcuts,
};
use crate::engine::core::window_config::create_window_config;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Each JSON asset type is keyed by its compound extension.
        .add_plugins(JsonAssetPlugin::<Snapshot>::new(&["snapshot.json"]))
        .add_plugins(JsonAssetPlugin::<BodyRadii>::new(&["radii.json"]))
        .add_plugins(JsonAssetPlugin::<EncounterCatalog>::new(&["encounters.json"]))
        .add_plugins(JsonAssetPlugin::<InstrumentCatalog>::new(&["instruments.json"]))
        .add_plugins(JsonAssetPlugin::<ViewerSettings>::new(&["settings.json"]))
        .init_gizmo_group::<PrimaryOverlayGizmos>()
        .init_gizmo_group::<SecondaryOverlayGizmos>()
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 15.0,
            ..default()
        });

    app.init_resource::<CatalogLoader>()
        .init_resource::<SnapshotRequests>()
        .init_resource::<ParentMap>()
        .init_resource::<BodyRadii>()
        .init_resource::<EncounterCatalog>()
        .init_resource::<InstrumentCatalog>()
        .init_resource::<ViewerSettings>()
        .init_resource::<RenderOrigin>()
        .add_event::<EpochCommand>()
        .add_event::<SnapshotApplied>()
        .add_event::<ZoomRequest>();

    app.add_systems(
        Startup,
        (
            start_loading,
            spawn_viewports,
            spawn_spacecraft,
            configure_overlay_gizmos,
        ),
    );

    // Catalog installation and snapshot publication run in every state so
    // the first snapshot can land while the viewer is still loading.
    app.add_systems(
        Update,
        (
            install_loaded::<BodyRadii>,
            install_loaded::<EncounterCatalog>,
            install_loaded::<InstrumentCatalog>,
            install_loaded::<ViewerSettings>,
        ),
    )
    .add_systems(
        Update,
        (
            follow_settings_epoch,
            handle_epoch_commands,
            publish_loaded_snapshot,
            update_render_origin,
            sync_bodies,
            rebuild_orbit_lines,
            rebuild_star_field,
            refresh_bound_rigs,
        )
            .chain(),
    )
    .add_systems(Update, (update_viewport_layout, apply_fov_settings))
    .add_systems(
        Update,
        transition_to_running.run_if(in_state(AppState::Loading)),
    )
    .add_systems(OnEnter(AppState::Running), zoom_to_initial_target);

    let runtime_systems = (
        // Input
        handle_camera_shortcuts,
        handle_epoch_shortcuts,
        handle_view_shortcuts,
        handle_zoom_requests,
        orbit_camera_input,
        // Cameras
        apply_orbit_camera_transforms,
        update_locked_camera,
        // Scene placement
        place_bodies,
        place_orbit_lines,
        place_star_field,
        update_spacecraft,
        // Gizmos
        draw_direction_cues,
        draw_primary_overlays,
        draw_secondary_overlays,
    )
        .chain()
        .after(refresh_bound_rigs);

    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
