use std::collections::BTreeMap;

use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keplerian elements at the snapshot epoch. Angles in radians, `a` in AU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub a: f64,
    pub e: f64,
    pub i: f64,
    /// Longitude of the ascending node.
    #[serde(rename = "Omega")]
    pub ascending_node: f64,
    /// Argument of periapsis.
    #[serde(rename = "omega")]
    pub periapsis_argument: f64,
}

impl OrbitalElements {
    fn is_finite(&self) -> bool {
        [
            self.a,
            self.e,
            self.i,
            self.ascending_node,
            self.periapsis_argument,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// One body's state. Moon positions are relative to their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyState {
    #[serde(rename = "positionAU")]
    pub position_au: [f64; 3],
    /// Body-to-world rotation as `[x, y, z, w]`.
    #[serde(default)]
    pub attitude: Option<[f64; 4]>,
    #[serde(default)]
    pub orbital_elements: Option<OrbitalElements>,
}

impl BodyState {
    pub fn position(&self) -> DVec3 {
        DVec3::from_array(self.position_au)
    }

    pub fn attitude(&self) -> Option<DQuat> {
        decode_attitude(self.attitude)
    }
}

/// Spacecraft state. Attitudes are telemetry quaternions `[x, y, z, w]`
/// in the reported (world-to-body) convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacecraftState {
    #[serde(rename = "positionAU")]
    pub position_au: [f64; 3],
    #[serde(default)]
    pub bus_attitude: Option<[f64; 4]>,
    #[serde(default)]
    pub array_attitude: Option<[f64; 4]>,
}

impl SpacecraftState {
    pub fn position(&self) -> DVec3 {
        DVec3::from_array(self.position_au)
    }

    pub fn bus_attitude(&self) -> Option<DQuat> {
        decode_attitude(self.bus_attitude)
    }

    pub fn array_attitude(&self) -> Option<DQuat> {
        decode_attitude(self.array_attitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    /// Unit direction; scaled out to the sky sphere when rendered.
    #[serde(rename = "positionAU")]
    pub position_au: [f64; 3],
    /// Normalised brightness in `[0, 1]`.
    pub magnitude: f64,
    #[serde(default)]
    pub name: String,
}

/// Everything the core needs for one epoch. Published whole; never patched.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub date: Option<String>,
    pub bodies: BTreeMap<String, BodyState>,
    pub spacecraft: SpacecraftState,
    #[serde(default)]
    pub star_field: Vec<StarRecord>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot contains no bodies")]
    Empty,

    #[error("non-finite position for {0}")]
    NonFinitePosition(String),

    #[error("non-finite attitude for {0}")]
    NonFiniteAttitude(String),

    #[error("non-finite orbital elements for {0}")]
    InvalidElements(String),
}

impl Snapshot {
    pub fn body(&self, name: &str) -> Option<&BodyState> {
        self.bodies.get(name)
    }

    /// Rejects snapshots that would push NaN or Infinity into any component.
    /// Finite but degenerate elements (open conics) are accepted; the orbit
    /// sampler omits those paths on its own.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.bodies.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let spacecraft = "spacecraft".to_string();
        if !all_finite(&self.spacecraft.position_au) {
            return Err(SnapshotError::NonFinitePosition(spacecraft));
        }
        for attitude in [self.spacecraft.bus_attitude, self.spacecraft.array_attitude]
            .iter()
            .flatten()
        {
            if !all_finite(attitude) {
                return Err(SnapshotError::NonFiniteAttitude(spacecraft));
            }
        }

        for (name, body) in &self.bodies {
            if !all_finite(&body.position_au) {
                return Err(SnapshotError::NonFinitePosition(name.clone()));
            }
            if body.attitude.is_some_and(|q| !all_finite(&q)) {
                return Err(SnapshotError::NonFiniteAttitude(name.clone()));
            }
            if body.orbital_elements.is_some_and(|el| !el.is_finite()) {
                return Err(SnapshotError::InvalidElements(name.clone()));
            }
        }

        Ok(())
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Decodes a raw `[x, y, z, w]` attitude. Absent, identity (either sign),
/// zero-length and non-finite quaternions all mean "no attitude data".
pub fn decode_attitude(raw: Option<[f64; 4]>) -> Option<DQuat> {
    let [x, y, z, w] = raw?;
    let q = DQuat::from_xyzw(x, y, z, w);
    if !q.is_finite() {
        return None;
    }
    let length = q.length();
    if length < 1e-12 {
        return None;
    }
    let q = q / length;
    if q.xyz().length_squared() < 1e-24 {
        return None;
    }
    Some(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "date": "2031-04-01T00:00:00Z",
        "bodies": {
            "Jupiter": {
                "positionAU": [5.0, 0.5, 0.0],
                "attitude": [0.0, 0.0, 0.0, 1.0],
                "orbitalElements": {"a": 5.2, "e": 0.048, "i": 0.022, "Omega": 1.75, "omega": 4.78}
            },
            "Europa": {"positionAU": [0.0045, 0.0, 0.0]}
        },
        "spacecraft": {
            "positionAU": [5.001, 0.5, 0.0],
            "busAttitude": [0.0, 0.0, 0.7071067811865476, 0.7071067811865476]
        },
        "starField": [{"positionAU": [1.0, 0.0, 0.0], "magnitude": 0.4, "name": "Vega"}]
    }"#;

    #[test]
    fn parses_the_published_shape() {
        let snapshot: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(snapshot.bodies.len(), 2);
        let jupiter = snapshot.body("Jupiter").unwrap();
        assert_eq!(jupiter.orbital_elements.unwrap().ascending_node, 1.75);
        assert_eq!(jupiter.orbital_elements.unwrap().periapsis_argument, 4.78);
        assert!(snapshot.body("Europa").unwrap().orbital_elements.is_none());
        assert_eq!(snapshot.star_field[0].name, "Vega");
        assert!(snapshot.spacecraft.array_attitude.is_none());
        assert_eq!(snapshot.validate(), Ok(()));
    }

    #[test]
    fn identity_attitude_is_no_data() {
        let snapshot: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        assert!(snapshot.body("Jupiter").unwrap().attitude().is_none());
        assert!(decode_attitude(Some([0.0, 0.0, 0.0, -1.0])).is_none());
        assert!(decode_attitude(Some([0.0; 4])).is_none());
        assert!(decode_attitude(Some([f64::NAN, 0.0, 0.0, 1.0])).is_none());
        assert!(snapshot.spacecraft.bus_attitude().is_some());
    }

    #[test]
    fn decoded_attitudes_are_normalised() {
        let q = decode_attitude(Some([0.0, 0.0, 2.0, 2.0])).unwrap();
        assert!((q.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_finite_positions() {
        let mut snapshot: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        snapshot.bodies.get_mut("Europa").unwrap().position_au[1] = f64::NAN;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::NonFinitePosition("Europa".into()))
        );
    }

    #[test]
    fn rejects_empty_and_broken_elements() {
        let mut snapshot: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        snapshot
            .bodies
            .get_mut("Jupiter")
            .unwrap()
            .orbital_elements
            .as_mut()
            .unwrap()
            .e = f64::INFINITY;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::InvalidElements("Jupiter".into()))
        );

        snapshot.bodies.clear();
        assert_eq!(snapshot.validate(), Err(SnapshotError::Empty));
    }

    #[test]
    fn missing_spacecraft_is_a_parse_error() {
        let broken = r#"{"bodies": {"Sun": {"positionAU": [0, 0, 0]}}}"#;
        assert!(serde_json::from_str::<Snapshot>(broken).is_err());
    }
}
