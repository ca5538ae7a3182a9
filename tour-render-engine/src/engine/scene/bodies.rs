use bevy::asset::RenderAssetUsages;
use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::NoFrustumCulling;
use constants::coordinate_system::mesh_pole_fix;
use constants::render_settings::FALLBACK_RADIUS_AU;

use super::RenderOrigin;
use crate::engine::frames::{FrameResolver, ParentMap};
use crate::engine::snapshot::catalog::{BodyKind, BodyRadii, appearance_for};
use crate::engine::snapshot::loader::{CurrentSnapshot, SnapshotApplied};

const STAR_LIGHT_INTENSITY: f32 = 4.0e6;
const STAR_LIGHT_RANGE_AU: f32 = 1.0e3;

#[derive(Component, Debug, Clone)]
pub struct BodyEntity {
    pub name: String,
    pub kind: BodyKind,
}

/// Fixed-size dot at a body's centre, visible when the sphere itself is
/// smaller than a pixel. Hidden along with its body.
#[derive(Component)]
pub struct BodyGlow;

/// Single point at the local origin.
pub fn glow_point_mesh() -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0f32; 3]]);
    mesh
}

/// Spawns a sphere for every snapshot body that has no entity yet. Bodies
/// that later drop out of a snapshot keep their entity and are hidden.
pub fn sync_bodies(
    mut applied: EventReader<SnapshotApplied>,
    current: Option<Res<CurrentSnapshot>>,
    existing: Query<&BodyEntity>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if applied.read().last().is_none() {
        return;
    }
    let Some(current) = current else {
        return;
    };

    let mut sphere: Option<Handle<Mesh>> = None;
    let mut glow_point: Option<Handle<Mesh>> = None;
    for name in current.snapshot.bodies.keys() {
        if existing.iter().any(|body| &body.name == name) {
            continue;
        }

        let appearance = appearance_for(name);
        let mesh = sphere
            .get_or_insert_with(|| meshes.add(Sphere::new(1.0).mesh().uv(64, 32)))
            .clone();
        let material = materials.add(body_material(appearance.kind, appearance.colour));

        let mut entity = commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::default(),
            Visibility::Hidden,
            BodyEntity {
                name: name.clone(),
                kind: appearance.kind,
            },
            Name::new(name.clone()),
        ));

        let glow_mesh = glow_point
            .get_or_insert_with(|| meshes.add(glow_point_mesh()))
            .clone();
        let glow_material = materials.add(StandardMaterial {
            base_color: appearance.colour,
            unlit: true,
            ..default()
        });
        entity.with_children(|parent| {
            parent.spawn((
                Mesh3d(glow_mesh),
                MeshMaterial3d(glow_material),
                Transform::default(),
                NoFrustumCulling,
                BodyGlow,
            ));
        });

        if appearance.kind == BodyKind::Star {
            entity.with_children(|parent| {
                parent.spawn(PointLight {
                    intensity: STAR_LIGHT_INTENSITY,
                    range: STAR_LIGHT_RANGE_AU,
                    radius: 0.0,
                    shadows_enabled: false,
                    ..default()
                });
            });
        }

        debug!("Spawned {:?} {}", appearance.kind, name);
    }
}

fn body_material(kind: BodyKind, colour: Color) -> StandardMaterial {
    match kind {
        BodyKind::Star => StandardMaterial {
            base_color: colour,
            emissive: colour.to_linear() * 10.0,
            unlit: true,
            ..default()
        },
        _ => StandardMaterial {
            base_color: colour,
            perceptual_roughness: 1.0,
            ..default()
        },
    }
}

/// Mesh scale for tri-axial radii. The mesh pole (Y) carries the body's
/// polar radius (Z) once the pole fix is applied.
pub fn mesh_scale(radii: DVec3) -> DVec3 {
    DVec3::new(radii.x, radii.z, radii.y)
}

/// Body orientation followed by the sphere-mesh pole fix.
pub fn body_rotation(attitude: Option<DQuat>) -> DQuat {
    attitude.unwrap_or(DQuat::IDENTITY) * mesh_pole_fix()
}

pub fn place_bodies(
    mut bodies: Query<(&BodyEntity, &mut Transform, &mut Visibility)>,
    current: Option<Res<CurrentSnapshot>>,
    parents: Res<ParentMap>,
    radii: Res<BodyRadii>,
    origin: Res<RenderOrigin>,
) {
    let Some(current) = current else {
        return;
    };
    let resolver = FrameResolver::new(&current.snapshot, &parents);

    for (body, mut transform, mut visibility) in &mut bodies {
        let Some(position) = resolver.resolve(&body.name) else {
            *visibility = Visibility::Hidden;
            continue;
        };

        let attitude = current
            .snapshot
            .body(&body.name)
            .and_then(|state| state.attitude());
        let scale = radii
            .radii_au(&body.name)
            .map(mesh_scale)
            .unwrap_or(DVec3::splat(FALLBACK_RADIUS_AU));

        *transform = Transform {
            translation: origin.to_render(position),
            rotation: body_rotation(attitude).as_quat(),
            scale: scale.as_vec3(),
        };
        *visibility = Visibility::Inherited;
    }
}
