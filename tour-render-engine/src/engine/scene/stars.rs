use bevy::asset::RenderAssetUsages;
use bevy::math::DVec3;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::NoFrustumCulling;
use constants::bodies::STAR_DIST_SCALE;

use super::RenderOrigin;
use crate::engine::snapshot::loader::{CurrentSnapshot, SnapshotApplied};
use crate::engine::snapshot::model::StarRecord;

/// Faintest stars are drawn at this brightness rather than black.
const MIN_STAR_BRIGHTNESS: f32 = 0.15;

#[derive(Component)]
pub struct StarField;

/// Rebuilds the star field when a snapshot with stars is published. A
/// snapshot without stars keeps the previous sky.
pub fn rebuild_star_field(
    mut applied: EventReader<SnapshotApplied>,
    current: Option<Res<CurrentSnapshot>>,
    existing: Query<Entity, With<StarField>>,
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
    let Some(mesh) = star_mesh(&current.snapshot.star_field) else {
        return;
    };

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        })),
        Transform::default(),
        NoFrustumCulling,
        StarField,
    ));
    info!("✓ Star field built with {} stars", current.snapshot.star_field.len());
}

/// Point list on the sky sphere, grey level from the normalised magnitude.
/// `None` when no star has a usable direction.
fn star_mesh(stars: &[StarRecord]) -> Option<Mesh> {
    let (positions, colours): (Vec<[f32; 3]>, Vec<[f32; 4]>) = stars
        .iter()
        .filter_map(|star| {
            let direction = DVec3::from_array(star.position_au).try_normalize()?;
            let brightness = if star.magnitude.is_finite() {
                (star.magnitude as f32).clamp(MIN_STAR_BRIGHTNESS, 1.0)
            } else {
                MIN_STAR_BRIGHTNESS
            };
            Some((
                (direction * STAR_DIST_SCALE).as_vec3().to_array(),
                [brightness, brightness, brightness, 1.0],
            ))
        })
        .unzip();

    if positions.is_empty() {
        return None;
    }

    let mut mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colours);
    Some(mesh)
}

/// The sky is centred on the system origin, not on the spacecraft.
pub fn place_star_field(
    mut stars: Query<&mut Transform, With<StarField>>,
    origin: Res<RenderOrigin>,
) {
    for mut transform in &mut stars {
        transform.translation = origin.to_render(DVec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    fn star(position: [f64; 3], magnitude: f64) -> StarRecord {
        StarRecord {
            position_au: position,
            magnitude,
            name: String::new(),
        }
    }

    #[test]
    fn stars_sit_on_the_sky_sphere() {
        let mesh = star_mesh(&[star([0.0, 3.0, 4.0], 0.9), star([0.0, 0.0, 0.0], 1.0)]).unwrap();
        assert_eq!(mesh.count_vertices(), 1);

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing position attribute");
        };
        assert_eq!(positions[0], [0.0, 600.0, 800.0]);
    }

    #[test]
    fn empty_field_builds_nothing() {
        assert!(star_mesh(&[]).is_none());
        assert!(star_mesh(&[star([f64::NAN, 0.0, 0.0], 0.5)]).is_none());
    }
}
