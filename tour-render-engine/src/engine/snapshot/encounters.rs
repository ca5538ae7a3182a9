//! Flyby encounter catalog used to jump the epoch to a planned event.

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use constants::bodies::{ENCOUNTER_TARGETS, ORBIT_INSERTION_CODE, ORBIT_INSERTION_NAME};
use serde::{Deserialize, Serialize};

use super::epoch::{EpochError, parse_epoch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub code: String,
    pub orbit_number: String,
    pub utc_date: String,
}

impl Encounter {
    pub fn epoch(&self) -> Result<DateTime<Utc>, EpochError> {
        parse_epoch(&self.utc_date)
    }

    pub fn description(&self) -> Option<String> {
        describe(&self.code)
    }
}

/// Ordered encounter list as published alongside the ephemeris.
#[derive(Asset, TypePath, Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterCatalog {
    pub encounters: Vec<Encounter>,
}

impl EncounterCatalog {
    pub fn find(&self, code: &str) -> Option<&Encounter> {
        self.encounters.iter().find(|encounter| encounter.code == code)
    }

    /// Encounter after `code` in catalog order, wrapping to the first.
    pub fn next_after(&self, code: Option<&str>) -> Option<&Encounter> {
        let position = code.and_then(|code| {
            self.encounters
                .iter()
                .position(|encounter| encounter.code == code)
        });
        match position {
            Some(index) => self.encounters.get((index + 1) % self.encounters.len()),
            None => self.encounters.first(),
        }
    }
}

/// Human readable label for an encounter code such as `E12` or `JOI`.
pub fn describe(code: &str) -> Option<String> {
    let code = code.trim();
    if code == ORBIT_INSERTION_CODE {
        return Some(ORBIT_INSERTION_NAME.to_string());
    }

    let initial = code.get(..1)?;
    ENCOUNTER_TARGETS
        .iter()
        .find(|(prefix, _)| *prefix == initial)
        .map(|(_, moon)| format!("{moon} targeted flyby"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EncounterCatalog {
        serde_json::from_str(
            r#"{"encounters": [
                {"code": "JOI", "orbitNumber": "0", "utcDate": "2030-04-11T12:00:00"},
                {"code": "G0", "orbitNumber": "1", "utcDate": "2030-07-20T05:12:00Z"},
                {"code": "E1", "orbitNumber": "4", "utcDate": "2031-03-19T09:30:00"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn describes_known_codes() {
        assert_eq!(describe("JOI").as_deref(), Some("Jupiter Orbit Insertion"));
        assert_eq!(describe("E12").as_deref(), Some("Europa targeted flyby"));
        assert_eq!(describe("G0").as_deref(), Some("Ganymede targeted flyby"));
        assert_eq!(describe("C3").as_deref(), Some("Callisto targeted flyby"));
        assert_eq!(describe("X1"), None);
        assert_eq!(describe(""), None);
    }

    #[test]
    fn encounter_dates_are_utc() {
        let catalog = catalog();
        let joi = catalog.find("JOI").unwrap();
        assert_eq!(
            crate::engine::snapshot::epoch::format_epoch(&joi.epoch().unwrap()),
            "2030-04-11T12:00:00.000Z"
        );
    }

    #[test]
    fn next_after_wraps() {
        let catalog = catalog();
        assert_eq!(catalog.next_after(None).unwrap().code, "JOI");
        assert_eq!(catalog.next_after(Some("G0")).unwrap().code, "E1");
        assert_eq!(catalog.next_after(Some("E1")).unwrap().code, "JOI");
        assert_eq!(catalog.next_after(Some("E99")).unwrap().code, "JOI");
        assert!(EncounterCatalog::default().next_after(None).is_none());
    }
}
