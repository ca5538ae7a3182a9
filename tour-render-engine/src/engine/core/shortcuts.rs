use bevy::prelude::*;
use constants::bodies::SPACECRAFT_NAME;

use crate::engine::camera::locked_camera::LockedStrategy;
use crate::engine::camera::orbit_camera::{CameraRig, ZoomRequest};
use crate::engine::settings::ViewerSettings;
use crate::engine::snapshot::epoch::EpochUnit;
use crate::engine::snapshot::loader::{CurrentSnapshot, EpochCommand};
use crate::engine::viewports::PrimaryView;

/// Name after `current` in `candidates`, wrapping. Starts at the first
/// candidate when nothing (or something unknown) is bound.
pub fn next_zoom_target<'a>(current: Option<&str>, candidates: &[&'a str]) -> Option<&'a str> {
    let next = current
        .and_then(|name| candidates.iter().position(|candidate| *candidate == name))
        .map_or(0, |index| (index + 1) % candidates.len());
    candidates.get(next).copied()
}

/// Unbinds the rig, returning the body it was following.
fn release(rig: &mut CameraRig) -> Option<String> {
    let name = rig.bound.clone();
    rig.unbind();
    name
}

/// Tab cycles the camera target, Escape releases it.
pub fn handle_camera_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut rigs: Query<&mut CameraRig, With<PrimaryView>>,
    current: Option<Res<CurrentSnapshot>>,
    mut zoom_requests: EventWriter<ZoomRequest>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        for mut rig in &mut rigs {
            if let Some(name) = release(&mut rig) {
                info!("Camera released from {}", name);
            }
        }
    }

    if keyboard.just_pressed(KeyCode::Tab) {
        let Some(current) = current else {
            return;
        };
        let Ok(rig) = rigs.single() else {
            return;
        };

        let candidates: Vec<&str> = std::iter::once(SPACECRAFT_NAME)
            .chain(current.snapshot.bodies.keys().map(String::as_str))
            .collect();
        if let Some(name) = next_zoom_target(rig.bound.as_deref(), &candidates) {
            zoom_requests.write(ZoomRequest {
                name: name.to_string(),
            });
        }
    }
}

/// Bracket keys step a day, comma and period an hour, N jumps to the next
/// encounter.
pub fn handle_epoch_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut epoch_commands: EventWriter<EpochCommand>,
) {
    let steps = [
        (KeyCode::BracketLeft, EpochUnit::Day, -1),
        (KeyCode::BracketRight, EpochUnit::Day, 1),
        (KeyCode::Comma, EpochUnit::Hour, -1),
        (KeyCode::Period, EpochUnit::Hour, 1),
    ];
    for (key, unit, delta) in steps {
        if keyboard.just_pressed(key) {
            epoch_commands.write(EpochCommand::Step { unit, delta });
        }
    }

    if keyboard.just_pressed(KeyCode::KeyN) {
        epoch_commands.write(EpochCommand::NextEncounter);
    }
}

/// L switches the locked-camera strategy, F toggles primary overlays.
pub fn handle_view_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<ViewerSettings>,
) {
    if keyboard.just_pressed(KeyCode::KeyL) {
        settings.locked_strategy = match settings.locked_strategy {
            LockedStrategy::BodyAxes => LockedStrategy::RollAngle,
            LockedStrategy::RollAngle => LockedStrategy::BodyAxes,
        };
        info!("Locked strategy: {:?}", settings.locked_strategy);
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        settings.show_primary_overlays = !settings.show_primary_overlays;
        info!("Primary overlays shown: {}", settings.show_primary_overlays);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGETS: [&str; 3] = ["Spacecraft", "Europa", "Jupiter"];

    #[test]
    fn cycles_in_order_and_wraps() {
        assert_eq!(next_zoom_target(Some("Spacecraft"), &TARGETS), Some("Europa"));
        assert_eq!(next_zoom_target(Some("Jupiter"), &TARGETS), Some("Spacecraft"));
    }

    #[test]
    fn escape_releases_the_bound_target() {
        let mut rig = CameraRig {
            bound: Some("Europa".to_string()),
            ..CameraRig::default()
        };
        assert_eq!(release(&mut rig).as_deref(), Some("Europa"));
        assert_eq!(rig.bound, None);
        assert_eq!(release(&mut rig), None);
    }

    #[test]
    fn unbound_or_unknown_starts_at_first() {
        assert_eq!(next_zoom_target(None, &TARGETS), Some("Spacecraft"));
        assert_eq!(next_zoom_target(Some("Pluto"), &TARGETS), Some("Spacecraft"));
        assert_eq!(next_zoom_target(None, &[]), None);
    }
}
