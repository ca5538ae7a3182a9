//! Physical sizes and per-body presentation, resolved once per body name.

use std::collections::BTreeMap;

use bevy::math::DVec3;
use bevy::prelude::*;
use constants::bodies::{
    BodyRole, DEFAULT_BODY_COLOUR, KM_PER_AU, SPACECRAFT_NAME, body_info,
};
use constants::render_settings::FALLBACK_RADIUS_AU;
use serde::{Deserialize, Serialize};

/// Tri-axial radii in kilometres keyed by body name.
#[derive(Asset, TypePath, Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRadii {
    #[serde(default)]
    pub radii_km: BTreeMap<String, [f64; 3]>,
}

impl BodyRadii {
    /// Radii in AU, `None` when the body is unlisted or its entry is unusable.
    pub fn radii_au(&self, name: &str) -> Option<DVec3> {
        let radii = DVec3::from_array(*self.radii_km.get(name)?) / KM_PER_AU;
        (radii.is_finite() && radii.min_element() > 0.0).then_some(radii)
    }

    /// Size used to frame the body: its first radius, or 1 km when unknown.
    pub fn characteristic_radius_au(&self, name: &str) -> f64 {
        self.radii_au(name)
            .map(|radii| radii.x)
            .unwrap_or(FALLBACK_RADIUS_AU)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    /// Emissive; carries the scene light.
    Star,
    Planet,
    Moon { parent: &'static str },
    Spacecraft,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyAppearance {
    pub kind: BodyKind,
    pub colour: Color,
}

/// Looks a name up in the static catalog. Uncatalogued bodies render as
/// plain white planets.
pub fn appearance_for(name: &str) -> BodyAppearance {
    if name == SPACECRAFT_NAME {
        return BodyAppearance {
            kind: BodyKind::Spacecraft,
            colour: DEFAULT_BODY_COLOUR,
        };
    }

    match body_info(name) {
        Some(info) => BodyAppearance {
            kind: match info.role {
                BodyRole::Star => BodyKind::Star,
                BodyRole::Planet => BodyKind::Planet,
                BodyRole::Moon { parent } => BodyKind::Moon { parent },
            },
            colour: info.colour,
        },
        None => BodyAppearance {
            kind: BodyKind::Planet,
            colour: DEFAULT_BODY_COLOUR,
        },
    }
}
