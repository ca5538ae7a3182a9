use bevy::prelude::*;
use constants::bodies::SPACECRAFT_NAME;

use crate::engine::camera::orbit_camera::ZoomRequest;
use crate::engine::settings::ViewerSettings;
use crate::engine::snapshot::loader::{CatalogLoader, CurrentSnapshot};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    /// Waiting for the catalogs and the first valid snapshot.
    #[default]
    Loading,
    Running,
}

pub fn transition_to_running(
    current: Option<Res<CurrentSnapshot>>,
    catalog_loader: Res<CatalogLoader>,
    asset_server: Res<AssetServer>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if current.is_some() && catalog_loader.settled(&asset_server) {
        info!("→ Catalogs and first snapshot ready, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}

/// Frames the configured body once the viewer starts running.
pub fn zoom_to_initial_target(
    settings: Res<ViewerSettings>,
    mut zoom_requests: EventWriter<ZoomRequest>,
) {
    let name = settings
        .initial_target
        .clone()
        .unwrap_or_else(|| SPACECRAFT_NAME.to_string());
    zoom_requests.write(ZoomRequest { name });
}
