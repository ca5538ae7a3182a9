use bevy::color::Color;

/// Kilometres per astronomical unit.
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Scale applied to star-field unit vectors so the sky sits well beyond the planets.
pub const STAR_DIST_SCALE: f64 = 1000.0;

/// Reserved name resolving to the spacecraft rather than a catalogued body.
pub const SPACECRAFT_NAME: &str = "Spacecraft";

/// Body whose resolved position the locked camera falls back to.
pub const FALLBACK_LOOK_TARGET: &str = "Europa";

/// Role of a body in the scene, resolved once when the catalog is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRole {
    /// Emissive and carries the scene's point light.
    Star,
    Planet,
    /// Positions are reported relative to the named parent.
    Moon { parent: &'static str },
}

pub struct BodyInfo {
    pub name: &'static str,
    pub role: BodyRole,
    pub colour: Color,
}

pub const BODY_CATALOG: &[BodyInfo] = &[
    BodyInfo {
        name: "Sun",
        role: BodyRole::Star,
        colour: Color::srgb(1.0, 1.0, 0.0),
    },
    BodyInfo {
        name: "Mercury",
        role: BodyRole::Planet,
        colour: Color::srgb(0.5, 0.5, 0.5),
    },
    BodyInfo {
        name: "Venus",
        role: BodyRole::Planet,
        colour: Color::srgb(1.0, 0.65, 0.0),
    },
    BodyInfo {
        name: "Earth",
        role: BodyRole::Planet,
        colour: Color::srgb(0.0, 0.0, 1.0),
    },
    BodyInfo {
        name: "Mars",
        role: BodyRole::Planet,
        colour: Color::srgb(1.0, 0.0, 0.0),
    },
    BodyInfo {
        name: "Jupiter",
        role: BodyRole::Planet,
        colour: Color::srgb(1.0, 0.65, 0.0),
    },
    BodyInfo {
        name: "Saturn",
        role: BodyRole::Planet,
        colour: Color::srgb(0.82, 0.71, 0.55),
    },
    BodyInfo {
        name: "Uranus",
        role: BodyRole::Planet,
        colour: Color::srgb(0.68, 0.85, 0.9),
    },
    BodyInfo {
        name: "Neptune",
        role: BodyRole::Planet,
        colour: Color::srgb(0.0, 0.0, 0.55),
    },
    BodyInfo {
        name: "Pluto",
        role: BodyRole::Planet,
        colour: Color::srgb(0.5, 0.0, 0.5),
    },
    BodyInfo {
        name: "Moon",
        role: BodyRole::Moon { parent: "Earth" },
        colour: Color::srgb(0.83, 0.83, 0.83),
    },
    BodyInfo {
        name: "Io",
        role: BodyRole::Moon { parent: "Jupiter" },
        colour: Color::srgb(1.0, 0.8, 0.0),
    },
    BodyInfo {
        name: "Europa",
        role: BodyRole::Moon { parent: "Jupiter" },
        colour: Color::srgb(0.0, 1.0, 1.0),
    },
    BodyInfo {
        name: "Ganymede",
        role: BodyRole::Moon { parent: "Jupiter" },
        colour: Color::srgb(0.8, 0.8, 0.8),
    },
    BodyInfo {
        name: "Callisto",
        role: BodyRole::Moon { parent: "Jupiter" },
        colour: Color::srgb(0.93, 0.93, 0.93),
    },
];

/// Colour for bodies that are missing from the catalog.
pub const DEFAULT_BODY_COLOUR: Color = Color::WHITE;

pub fn body_info(name: &str) -> Option<&'static BodyInfo> {
    BODY_CATALOG.iter().find(|info| info.name == name)
}

/// Encounter code prefixes and the target they name.
pub const ENCOUNTER_TARGETS: &[(&str, &str)] = &[
    ("G", "Ganymede"),
    ("E", "Europa"),
    ("C", "Callisto"),
];

/// Encounter code for orbit insertion, which has no flyby target.
pub const ORBIT_INSERTION_CODE: &str = "JOI";
pub const ORBIT_INSERTION_NAME: &str = "Jupiter Orbit Insertion";
