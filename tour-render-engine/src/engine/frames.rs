use std::collections::HashMap;

use bevy::math::DVec3;
use bevy::prelude::*;
use constants::bodies::{BODY_CATALOG, BodyRole, SPACECRAFT_NAME};

use crate::engine::snapshot::model::Snapshot;

/// Static `moon -> planet` relationships. A body absent from the map is
/// top-level and its reported position is already absolute.
///
/// Only one level of nesting is supported: a moon's parent is assumed to be
/// top-level. Deeper hierarchies would need an indexed body tree.
#[derive(Resource, Debug, Clone)]
pub struct ParentMap {
    parents: HashMap<String, String>,
}

impl ParentMap {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            parents: pairs
                .into_iter()
                .map(|(child, parent)| (child.into(), parent.into()))
                .collect(),
        }
    }

    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }
}

impl Default for ParentMap {
    fn default() -> Self {
        Self::new(BODY_CATALOG.iter().filter_map(|info| match info.role {
            BodyRole::Moon { parent } => Some((info.name, parent)),
            _ => None,
        }))
    }
}

/// Absolute positions for one snapshot.
pub struct FrameResolver<'a> {
    snapshot: &'a Snapshot,
    parents: &'a ParentMap,
}

impl<'a> FrameResolver<'a> {
    pub fn new(snapshot: &'a Snapshot, parents: &'a ParentMap) -> Self {
        Self { snapshot, parents }
    }

    pub fn spacecraft_position(&self) -> DVec3 {
        self.snapshot.spacecraft.position()
    }

    /// Absolute position of a body or of the spacecraft. `None` means the
    /// entity cannot be placed this frame and should be skipped.
    pub fn resolve(&self, name: &str) -> Option<DVec3> {
        if name == SPACECRAFT_NAME {
            return Some(self.spacecraft_position());
        }

        let body = self.snapshot.body(name)?;
        Some(self.parent_origin(name) + body.position())
    }

    /// Absolute position a body's reported position is relative to: its
    /// parent when the parent is present, otherwise the system origin.
    pub fn parent_origin(&self, name: &str) -> DVec3 {
        self.parents
            .parent_of(name)
            .and_then(|parent| self.snapshot.body(parent))
            .map(|parent| parent.position())
            .unwrap_or(DVec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::model::{BodyState, SpacecraftState};

    fn body(position: [f64; 3]) -> BodyState {
        BodyState {
            position_au: position,
            attitude: None,
            orbital_elements: None,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            date: None,
            bodies: [
                ("Jupiter".to_string(), body([5.0, 1.0, -0.1])),
                ("Europa".to_string(), body([0.0045, -0.001, 0.0002])),
                ("Moon".to_string(), body([0.0025, 0.0, 0.0])),
                ("Sun".to_string(), body([0.001, 0.002, 0.0])),
            ]
            .into_iter()
            .collect(),
            spacecraft: SpacecraftState {
                position_au: [5.002, 1.001, -0.1],
                bus_attitude: None,
                array_attitude: None,
            },
            star_field: Vec::new(),
        }
    }

    #[test]
    fn moons_are_offset_from_their_parent() {
        let snapshot = snapshot();
        let parents = ParentMap::default();
        let resolver = FrameResolver::new(&snapshot, &parents);

        let europa = resolver.resolve("Europa").unwrap();
        let jupiter = resolver.resolve("Jupiter").unwrap();
        let relative = europa - jupiter;
        assert!(relative.abs_diff_eq(DVec3::new(0.0045, -0.001, 0.0002), 1e-12));
    }

    #[test]
    fn spacecraft_ignores_body_table() {
        let mut snapshot = snapshot();
        let parents = ParentMap::default();
        let expected = DVec3::new(5.002, 1.001, -0.1);
        assert_eq!(
            FrameResolver::new(&snapshot, &parents).resolve(SPACECRAFT_NAME),
            Some(expected)
        );

        snapshot.bodies.clear();
        assert_eq!(
            FrameResolver::new(&snapshot, &parents).resolve(SPACECRAFT_NAME),
            Some(expected)
        );
    }

    #[test]
    fn unknown_body_is_unresolvable() {
        let snapshot = snapshot();
        let parents = ParentMap::default();
        assert_eq!(FrameResolver::new(&snapshot, &parents).resolve("Titan"), None);
    }

    #[test]
    fn missing_parent_leaves_position_as_reported() {
        // Earth is absent, so the Moon's position is taken as absolute.
        let snapshot = snapshot();
        let parents = ParentMap::default();
        let moon = FrameResolver::new(&snapshot, &parents).resolve("Moon");
        assert_eq!(moon, Some(DVec3::new(0.0025, 0.0, 0.0)));
    }

    #[test]
    fn top_level_bodies_are_absolute() {
        let snapshot = snapshot();
        let parents = ParentMap::default();
        let sun = FrameResolver::new(&snapshot, &parents).resolve("Sun");
        assert_eq!(sun, Some(DVec3::new(0.001, 0.002, 0.0)));
    }

    #[test]
    fn default_map_lists_catalogued_moons() {
        let parents = ParentMap::default();
        assert_eq!(parents.parent_of("Europa"), Some("Jupiter"));
        assert_eq!(parents.parent_of("Moon"), Some("Earth"));
        assert_eq!(parents.parent_of("Jupiter"), None);
    }
}
