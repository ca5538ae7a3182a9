use bevy::asset::LoadState;
use bevy::prelude::*;
use chrono::{DateTime, Utc};

use super::catalog::BodyRadii;
use super::encounters::{Encounter, EncounterCatalog};
use super::epoch::{EpochUnit, format_epoch, parse_epoch, snapshot_asset_path, step_epoch};
use super::model::Snapshot;
use crate::engine::fov_overlay::InstrumentCatalog;
use crate::engine::settings::ViewerSettings;

pub const RADII_PATH: &str = "catalogs/bodies.radii.json";
pub const ENCOUNTERS_PATH: &str = "catalogs/tour.encounters.json";
pub const INSTRUMENTS_PATH: &str = "catalogs/fov.instruments.json";
pub const SETTINGS_PATH: &str = "config/viewer.settings.json";

/// Sequence bookkeeping for snapshot requests. Only the most recently issued
/// request may be published, and never twice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RequestLedger {
    latest_issued: u64,
    latest_applied: u64,
}

impl RequestLedger {
    pub fn issue(&mut self) -> u64 {
        self.latest_issued += 1;
        self.latest_issued
    }

    pub fn is_current(&self, sequence: u64) -> bool {
        sequence == self.latest_issued
    }

    /// Records `sequence` as published. Fails for superseded or already
    /// published sequences.
    pub fn mark_applied(&mut self, sequence: u64) -> bool {
        if self.is_current(sequence) && sequence > self.latest_applied {
            self.latest_applied = sequence;
            true
        } else {
            false
        }
    }
}

struct PendingSnapshot {
    sequence: u64,
    epoch: DateTime<Utc>,
    handle: Handle<Snapshot>,
}

/// Outstanding snapshot load and the epoch the viewer is heading to.
#[derive(Resource, Default)]
pub struct SnapshotRequests {
    ledger: RequestLedger,
    pending: Option<PendingSnapshot>,
    requested_epoch: Option<DateTime<Utc>>,
    selected_encounter: Option<String>,
}

impl SnapshotRequests {
    /// Starts loading the snapshot for `epoch`. Any load still in flight is
    /// superseded and its result will be discarded.
    pub fn request(&mut self, epoch: DateTime<Utc>, asset_server: &AssetServer) -> u64 {
        let path = snapshot_asset_path(&epoch);
        info!("Requesting snapshot from {}", path);
        self.track(epoch, asset_server.load(path))
    }

    /// Makes `handle` the one outstanding snapshot load for `epoch`.
    fn track(&mut self, epoch: DateTime<Utc>, handle: Handle<Snapshot>) -> u64 {
        let sequence = self.ledger.issue();
        if let Some(stale) = self.pending.take() {
            debug!(
                "Snapshot request #{} for {} superseded by #{}",
                stale.sequence,
                format_epoch(&stale.epoch),
                sequence
            );
        }

        self.pending = Some(PendingSnapshot {
            sequence,
            epoch,
            handle,
        });
        self.requested_epoch = Some(epoch);
        sequence
    }

    pub fn requested_epoch(&self) -> Option<DateTime<Utc>> {
        self.requested_epoch
    }

    pub fn selected_encounter(&self) -> Option<&str> {
        self.selected_encounter.as_deref()
    }
}

/// The snapshot every per-frame system reads. Replaced whole on publication.
#[derive(Resource, Debug, Clone)]
pub struct CurrentSnapshot {
    pub snapshot: Snapshot,
    pub epoch: DateTime<Utc>,
    pub sequence: u64,
}

/// Fired once per published snapshot, after `CurrentSnapshot` is replaced.
#[derive(Event, Debug, Clone, Copy)]
pub struct SnapshotApplied {
    pub sequence: u64,
}

/// Ways the user can move the viewer to a new epoch.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum EpochCommand {
    Set(String),
    Step { unit: EpochUnit, delta: i64 },
    SelectEncounter(String),
    NextEncounter,
}

#[derive(Resource, Default)]
pub struct CatalogLoader {
    radii: Option<Handle<BodyRadii>>,
    encounters: Option<Handle<EncounterCatalog>>,
    instruments: Option<Handle<InstrumentCatalog>>,
    settings: Option<Handle<ViewerSettings>>,
}

impl CatalogLoader {
    /// True once every catalog has either loaded or failed. Missing catalogs
    /// fall back to their defaults.
    pub fn settled(&self, asset_server: &AssetServer) -> bool {
        [
            self.radii.as_ref().map(|handle| handle.id().untyped()),
            self.encounters.as_ref().map(|handle| handle.id().untyped()),
            self.instruments.as_ref().map(|handle| handle.id().untyped()),
            self.settings.as_ref().map(|handle| handle.id().untyped()),
        ]
        .into_iter()
        .all(|id| {
            id.is_some_and(|id| {
                matches!(
                    asset_server.load_state(id),
                    LoadState::Loaded | LoadState::Failed(_)
                )
            })
        })
    }
}

// Start the loading process
pub fn start_loading(
    mut catalog_loader: ResMut<CatalogLoader>,
    mut requests: ResMut<SnapshotRequests>,
    asset_server: Res<AssetServer>,
) {
    catalog_loader.radii = Some(asset_server.load(RADII_PATH));
    catalog_loader.encounters = Some(asset_server.load(ENCOUNTERS_PATH));
    catalog_loader.instruments = Some(asset_server.load(INSTRUMENTS_PATH));
    catalog_loader.settings = Some(asset_server.load(SETTINGS_PATH));

    requests.request(Utc::now(), &asset_server);
}

/// Copies a loaded (or hot-reloaded) catalog asset into the resource of the
/// same type.
pub fn install_loaded<T: Asset + Resource + Clone>(
    mut events: EventReader<AssetEvent<T>>,
    assets: Res<Assets<T>>,
    mut commands: Commands,
) {
    for event in events.read() {
        if let AssetEvent::LoadedWithDependencies { id } | AssetEvent::Modified { id } = event {
            if let Some(asset) = assets.get(*id) {
                info!("✓ {} loaded", T::short_type_path());
                commands.insert_resource(asset.clone());
            }
        }
    }
}

/// Re-targets the epoch whenever loaded settings name one.
pub fn follow_settings_epoch(
    settings: Res<ViewerSettings>,
    mut commands: EventWriter<EpochCommand>,
    mut last_seen: Local<Option<String>>,
) {
    if !settings.is_changed() || settings.initial_epoch == *last_seen {
        return;
    }
    *last_seen = settings.initial_epoch.clone();
    if let Some(epoch) = &settings.initial_epoch {
        commands.write(EpochCommand::Set(epoch.clone()));
    }
}

/// Turns epoch commands into snapshot requests.
pub fn handle_epoch_commands(
    mut commands: EventReader<EpochCommand>,
    mut requests: ResMut<SnapshotRequests>,
    encounters: Res<EncounterCatalog>,
    asset_server: Res<AssetServer>,
) {
    for command in commands.read() {
        let target = match command {
            EpochCommand::Set(raw) => parse_epoch(raw).map_err(|err| err.to_string()),
            EpochCommand::Step { unit, delta } => requests
                .requested_epoch()
                .ok_or_else(|| "no epoch to step from".to_string())
                .and_then(|epoch| {
                    step_epoch(epoch, *unit, *delta).map_err(|err| err.to_string())
                }),
            EpochCommand::SelectEncounter(code) => {
                select_encounter(&mut requests, encounters.find(code))
            }
            EpochCommand::NextEncounter => {
                let next = encounters.next_after(requests.selected_encounter());
                select_encounter(&mut requests, next)
            }
        };

        match target {
            Ok(epoch) => {
                requests.request(epoch, &asset_server);
            }
            Err(reason) => warn!("Ignoring {:?}: {}", command, reason),
        }
    }
}

fn select_encounter(
    requests: &mut SnapshotRequests,
    encounter: Option<&Encounter>,
) -> Result<DateTime<Utc>, String> {
    let encounter = encounter.ok_or_else(|| "unknown encounter".to_string())?;
    let epoch = encounter.epoch().map_err(|err| err.to_string())?;
    info!(
        "Encounter {} ({})",
        encounter.code,
        encounter.description().unwrap_or_default()
    );
    requests.selected_encounter = Some(encounter.code.clone());
    Ok(epoch)
}

/// Publishes the latest requested snapshot once it has loaded and validated.
pub fn publish_loaded_snapshot(
    mut requests: ResMut<SnapshotRequests>,
    snapshots: Res<Assets<Snapshot>>,
    asset_server: Res<AssetServer>,
    mut applied: EventWriter<SnapshotApplied>,
    mut commands: Commands,
) {
    let Some(pending) = requests.pending.as_ref() else {
        return;
    };

    if matches!(asset_server.load_state(&pending.handle), LoadState::Failed(_)) {
        warn!(
            "Snapshot for {} failed to load; keeping the previous snapshot",
            format_epoch(&pending.epoch)
        );
        requests.pending = None;
        return;
    }

    let Some(snapshot) = snapshots.get(&pending.handle) else {
        return;
    };

    let Some(pending) = requests.pending.take() else {
        return;
    };
    if let Err(err) = snapshot.validate() {
        warn!(
            "Rejected snapshot for {}: {}; keeping the previous snapshot",
            format_epoch(&pending.epoch),
            err
        );
        return;
    }
    if !requests.ledger.mark_applied(pending.sequence) {
        debug!("Discarding stale snapshot #{}", pending.sequence);
        return;
    }

    info!(
        "✓ Snapshot #{} applied for {} ({} bodies)",
        pending.sequence,
        format_epoch(&pending.epoch),
        snapshot.bodies.len()
    );
    commands.insert_resource(CurrentSnapshot {
        snapshot: snapshot.clone(),
        epoch: pending.epoch,
        sequence: pending.sequence,
    });
    applied.write(SnapshotApplied {
        sequence: pending.sequence,
    });
}
