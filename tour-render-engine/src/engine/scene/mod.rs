//! Scene content placed around a floating render origin.
//!
//! All positions are kept in double precision AU and converted to single
//! precision relative to the spacecraft only when written into a `Transform`.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::engine::snapshot::loader::CurrentSnapshot;

/// Planet, moon and star meshes with per-frame placement.
///
/// Stars also carry the scene's point light.
pub mod bodies;

/// Faded orbit rings rebuilt on every published snapshot.
pub mod orbit_lines;

/// Spacecraft bus and hinged solar array, plus direction cue arrows.
pub mod spacecraft;

/// Background star field as a point list on a distant sphere.
pub mod stars;

/// Absolute position mapped to the render-space origin.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOrigin(pub DVec3);

impl RenderOrigin {
    pub fn to_render(&self, absolute: DVec3) -> Vec3 {
        (absolute - self.0).as_vec3()
    }
}

/// Re-centres rendering on the spacecraft.
pub fn update_render_origin(current: Option<Res<CurrentSnapshot>>, mut origin: ResMut<RenderOrigin>) {
    let Some(current) = current else {
        return;
    };
    let spacecraft = current.snapshot.spacecraft.position();
    if origin.0 != spacecraft {
        origin.0 = spacecraft;
    }
}
