use bevy::asset::RenderAssetUsages;
use bevy::math::DVec3;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::NoFrustumCulling;

use super::RenderOrigin;
use crate::engine::frames::{FrameResolver, ParentMap};
use crate::engine::orbits::OrbitSample;
use crate::engine::snapshot::catalog::{BodyKind, appearance_for};
use crate::engine::snapshot::loader::{CurrentSnapshot, SnapshotApplied};

/// One orbit ring. Vertices are stored relative to `centre` so the mesh keeps
/// its precision wherever the render origin sits.
#[derive(Component, Debug, Clone)]
pub struct OrbitLine {
    pub owner: String,
    pub centre: DVec3,
}

/// Replaces every orbit ring from the newly published snapshot.
pub fn rebuild_orbit_lines(
    mut applied: EventReader<SnapshotApplied>,
    current: Option<Res<CurrentSnapshot>>,
    parents: Res<ParentMap>,
    lines: Query<Entity, With<OrbitLine>>,
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

    for entity in &lines {
        commands.entity(entity).despawn();
    }

    let resolver = FrameResolver::new(&current.snapshot, &parents);
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    let mut built = 0;
    for (name, body) in &current.snapshot.bodies {
        let appearance = appearance_for(name);
        if appearance.kind == BodyKind::Star {
            continue;
        }
        let Some(elements) = body.orbital_elements.as_ref() else {
            continue;
        };
        let Some(owner_position) = resolver.resolve(name) else {
            continue;
        };

        let centre = resolver.parent_origin(name);
        let Some(sample) = OrbitSample::sample(Some(elements), centre, owner_position) else {
            warn!("Orbit of {} is degenerate ({:?}); not drawn", name, elements);
            continue;
        };

        let mesh = orbit_line_mesh(&sample, centre, appearance.colour);
        commands.spawn((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(material.clone()),
            Transform::default(),
            NoFrustumCulling,
            OrbitLine {
                owner: name.clone(),
                centre,
            },
        ));
        built += 1;
    }

    debug!("Built {} orbit lines for snapshot #{}", built, current.sequence);
}

/// Line strip through the sampled ring, alpha taken from the fade weights.
fn orbit_line_mesh(sample: &OrbitSample, centre: DVec3, colour: Color) -> Mesh {
    let positions: Vec<[f32; 3]> = sample
        .points
        .iter()
        .map(|p| (*p - centre).as_vec3().to_array())
        .collect();
    let base = colour.to_linear();
    let colours: Vec<[f32; 4]> = sample
        .weights
        .iter()
        .map(|w| [base.red, base.green, base.blue, *w])
        .collect();

    let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colours);
    mesh
}

pub fn place_orbit_lines(
    mut lines: Query<(&OrbitLine, &mut Transform)>,
    origin: Res<RenderOrigin>,
) {
    for (line, mut transform) in &mut lines {
        transform.translation = origin.to_render(line.centre);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::model::OrbitalElements;
    use bevy::render::mesh::VertexAttributeValues;

    #[test]
    fn mesh_carries_one_colour_per_point() {
        let elements = OrbitalElements {
            a: 0.0045,
            e: 0.01,
            i: 0.0,
            ascending_node: 0.0,
            periapsis_argument: 0.0,
        };
        let centre = DVec3::new(5.0, 1.0, 0.0);
        let sample =
            OrbitSample::sample(Some(&elements), centre, centre + DVec3::X * 0.0045).unwrap();
        let mesh = orbit_line_mesh(&sample, centre, Color::WHITE);

        assert_eq!(mesh.count_vertices(), sample.points.len());
        let Some(VertexAttributeValues::Float32x4(colours)) =
            mesh.attribute(Mesh::ATTRIBUTE_COLOR)
        else {
            panic!("missing colour attribute");
        };
        assert_eq!(colours[sample.band_centre][3], 1.0);
        assert!(colours.iter().any(|c| c[3] == 0.0));

        // Vertices are relative to the orbit centre.
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing position attribute");
        };
        assert!(positions.iter().all(|p| Vec3::from(*p).length() < 0.005));
    }
}
