use bevy::math::DVec3;
use bevy::prelude::*;
use constants::render_settings::{DIRECTION_CUE_LENGTH_AU, SPACECRAFT_MODEL_SCALE};

use super::RenderOrigin;
use crate::engine::articulation::decompose;
use crate::engine::frames::{FrameResolver, ParentMap};
use crate::engine::snapshot::loader::CurrentSnapshot;

const BUS_MODEL_PATH: &str = "models/spacecraft_bus.glb";
const ARRAY_MODEL_PATH: &str = "models/spacecraft_array.glb";

/// Bodies the direction cues point at, with their arrow colours.
const DIRECTION_CUES: [(&str, Color); 3] = [
    ("Europa", Color::srgb(0.0, 1.0, 1.0)),
    ("Sun", Color::srgb(1.0, 1.0, 0.0)),
    ("Earth", Color::srgb(0.0, 1.0, 0.0)),
];

/// Root of the spacecraft model; scales model units to AU.
#[derive(Component)]
pub struct SpacecraftRoot;

#[derive(Component)]
pub struct SpacecraftBus;

#[derive(Component)]
pub struct SolarArray;

pub fn spawn_spacecraft(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands
        .spawn((
            SpacecraftRoot,
            Transform::from_scale(Vec3::splat(SPACECRAFT_MODEL_SCALE as f32)),
            Visibility::Hidden,
            Name::new("Spacecraft"),
        ))
        .with_children(|parent| {
            parent.spawn((
                SpacecraftBus,
                SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(BUS_MODEL_PATH))),
                Transform::default(),
            ));
            parent.spawn((
                SolarArray,
                SceneRoot(
                    asset_server.load(GltfAssetLabel::Scene(0).from_asset(ARRAY_MODEL_PATH)),
                ),
                Transform::default(),
            ));
        });
}

/// Places the model at the spacecraft and applies the bus and hinge
/// rotations from the current snapshot.
pub fn update_spacecraft(
    mut root: Query<
        (&mut Transform, &mut Visibility),
        (With<SpacecraftRoot>, Without<SpacecraftBus>, Without<SolarArray>),
    >,
    mut bus: Query<&mut Transform, (With<SpacecraftBus>, Without<SolarArray>)>,
    mut array: Query<&mut Transform, (With<SolarArray>, Without<SpacecraftBus>)>,
    current: Option<Res<CurrentSnapshot>>,
    origin: Res<RenderOrigin>,
) {
    let Some(current) = current else {
        return;
    };
    let spacecraft = &current.snapshot.spacecraft;
    let hinge = decompose(spacecraft.bus_attitude(), spacecraft.array_attitude());
    let (array_offset, array_rotation) = hinge.array_pose();

    if let Ok((mut transform, mut visibility)) = root.single_mut() {
        transform.translation = origin.to_render(spacecraft.position());
        *visibility = Visibility::Inherited;
    }
    if let Ok(mut transform) = bus.single_mut() {
        transform.rotation = hinge.bus_world_attitude.as_quat();
    }
    if let Ok(mut transform) = array.single_mut() {
        transform.translation = array_offset.as_vec3();
        transform.rotation = array_rotation.as_quat();
    }
}

/// End point of a cue arrow of `length` from `from` towards `to`. `None`
/// when the two coincide.
pub fn cue_end(from: DVec3, to: DVec3, length: f64) -> Option<DVec3> {
    Some(from + (to - from).try_normalize()? * length)
}

pub fn draw_direction_cues(
    mut gizmos: Gizmos,
    current: Option<Res<CurrentSnapshot>>,
    parents: Res<ParentMap>,
    origin: Res<RenderOrigin>,
) {
    let Some(current) = current else {
        return;
    };
    let resolver = FrameResolver::new(&current.snapshot, &parents);
    let from = resolver.spacecraft_position();

    for (name, colour) in DIRECTION_CUES {
        let Some(end) = resolver
            .resolve(name)
            .and_then(|to| cue_end(from, to, DIRECTION_CUE_LENGTH_AU))
        else {
            continue;
        };
        gizmos.arrow(origin.to_render(from), origin.to_render(end), colour);
    }
}
