//! Keplerian orbit sampling with a fade window keyed to the body's phase.

use std::f64::consts::TAU;

use bevy::math::{DQuat, DVec3};
use constants::render_settings::{
    MAX_SAMPLED_ECCENTRICITY, MIN_CONIC_DENOMINATOR, ORBIT_LEAD_FRACTION, ORBIT_SAMPLES,
};

use crate::engine::snapshot::model::OrbitalElements;

/// Closed polyline around an orbit with one visibility weight per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSample {
    /// `samples + 1` points; the last repeats the first.
    pub points: Vec<DVec3>,
    pub weights: Vec<f32>,
    /// Index the bright band is centred on.
    pub band_centre: usize,
}

impl OrbitSample {
    /// Samples the ring with the default resolution. `origin` is the absolute
    /// position the orbit is centred on (the parent for moons, the system
    /// origin otherwise); `owner_position` is the body's absolute position.
    pub fn sample(
        elements: Option<&OrbitalElements>,
        origin: DVec3,
        owner_position: DVec3,
    ) -> Option<Self> {
        Self::sample_with(elements?, origin, owner_position, ORBIT_SAMPLES)
    }

    pub fn sample_with(
        elements: &OrbitalElements,
        origin: DVec3,
        owner_position: DVec3,
        samples: usize,
    ) -> Option<Self> {
        if samples < 4 {
            return None;
        }
        let points = conic_points(elements, samples)?
            .into_iter()
            .map(|p| origin + p)
            .collect::<Vec<_>>();

        let nearest = nearest_index(&points, owner_position);
        let band_centre = wrap_index(nearest as i64 - lead_samples(samples) as i64, samples + 1);
        let weights = fade_weights(band_centre, samples);

        Some(Self {
            points,
            weights,
            band_centre,
        })
    }
}

/// Points of the conic in the reference frame, relative to the focus.
/// `None` for open or singular conics and non-finite results.
pub fn conic_points(elements: &OrbitalElements, samples: usize) -> Option<Vec<DVec3>> {
    let OrbitalElements {
        a,
        e,
        i,
        ascending_node,
        periapsis_argument,
    } = *elements;

    if !(e >= 0.0 && e < MAX_SAMPLED_ECCENTRICITY) || !(a > 0.0) {
        return None;
    }

    // Perifocal -> reference: periapsis argument about Z, then inclination
    // about X, then ascending node about Z.
    let orientation = DQuat::from_rotation_z(ascending_node)
        * DQuat::from_rotation_x(i)
        * DQuat::from_rotation_z(periapsis_argument);
    let semi_latus = a * (1.0 - e * e);

    let mut points = Vec::with_capacity(samples + 1);
    for k in 0..=samples {
        // Index `samples` repeats index 0 exactly to close the ring.
        let nu = TAU * (k % samples) as f64 / samples as f64;
        let denominator = 1.0 + e * nu.cos();
        if denominator < MIN_CONIC_DENOMINATOR {
            return None;
        }
        let r = semi_latus / denominator;
        let point = orientation * DVec3::new(r * nu.cos(), r * nu.sin(), 0.0);
        if !point.is_finite() {
            return None;
        }
        points.push(point);
    }
    Some(points)
}

/// Lowest index of the point closest to `target`.
fn nearest_index(points: &[DVec3], target: DVec3) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, point) in points.iter().enumerate() {
        let distance = point.distance_squared(target);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

fn lead_samples(samples: usize) -> usize {
    (ORBIT_LEAD_FRACTION * samples as f64 / 2.0).ceil() as usize
}

/// Non-negative remainder, independent of the sign of `value`.
fn wrap_index(value: i64, modulus: usize) -> usize {
    value.rem_euclid(modulus as i64) as usize
}

/// Half the ring (`samples / 2 + 1` vertices) centred on `centre` is fully
/// visible. Going backward from the band's trailing edge the weight falls
/// linearly to zero over the remaining vertices.
pub fn fade_weights(centre: usize, samples: usize) -> Vec<f32> {
    let ring = samples + 1;
    let fade_len = samples / 2;
    let half_band = fade_len / 2;

    (0..ring)
        .map(|k| {
            // Distance behind the band's leading edge, walking backward.
            let behind = wrap_index(
                centre as i64 + half_band as i64 - k as i64,
                ring,
            );
            if behind <= fade_len {
                1.0
            } else if behind <= 2 * fade_len {
                (1.0 - (behind - fade_len) as f64 / fade_len as f64) as f32
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn circle() -> OrbitalElements {
        OrbitalElements {
            a: 1.0,
            e: 0.0,
            i: 0.0,
            ascending_node: 0.0,
            periapsis_argument: 0.0,
        }
    }

    fn full_weight_indices(weights: &[f32]) -> Vec<usize> {
        weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w == 1.0)
            .map(|(k, _)| k)
            .collect()
    }

    /// True when the marked indices form one run on the ring.
    fn is_contiguous_on_ring(indices: &[usize], ring: usize) -> bool {
        let mut marked = vec![false; ring];
        for &k in indices {
            marked[k] = true;
        }
        let starts = (0..ring)
            .filter(|&k| marked[k] && !marked[(k + ring - 1) % ring])
            .count();
        starts == 1 || indices.len() == ring
    }

    #[test]
    fn unit_circle_in_xy_plane() {
        let sample = OrbitSample::sample(Some(&circle()), DVec3::ZERO, DVec3::X).unwrap();
        assert_eq!(sample.points.len(), ORBIT_SAMPLES + 1);
        for p in &sample.points {
            assert_relative_eq!(p.length(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
        }
        assert_eq!(sample.points[0], sample.points[ORBIT_SAMPLES]);
    }

    #[test]
    fn owner_at_periapsis_centres_band_on_index_zero() {
        let sample = OrbitSample::sample(Some(&circle()), DVec3::ZERO, DVec3::X).unwrap();
        let n = ORBIT_SAMPLES;
        let ring = n + 1;
        // Lead offset of ceil(0.005 * 1024 / 2) = 3 samples, wrapping below zero.
        assert_eq!(sample.band_centre, ring - 3);

        let lit = full_weight_indices(&sample.weights);
        assert_eq!(lit.len(), n / 2 + 1);
        for k in (n - n / 4)..=n {
            assert_eq!(sample.weights[k], 1.0, "index {k}");
        }
        for k in 0..(n / 4 - 3) {
            assert_eq!(sample.weights[k], 1.0, "index {k}");
        }
        let faded = sample.weights[n / 2];
        assert!(faded > 0.0 && faded < 1.0);
        assert!(sample.weights.iter().any(|w| *w == 0.0));
    }

    #[test]
    fn weights_fall_monotonically_behind_the_band() {
        let weights = fade_weights(0, 16);
        // Band covers 13..=16 and 0..=4; the tail walks back from 12 to 5.
        assert_eq!(full_weight_indices(&weights), vec![0, 1, 2, 3, 4, 13, 14, 15, 16]);
        let tail: Vec<f32> = (5..=12).rev().map(|k| weights[k]).collect();
        for pair in tail.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        assert_eq!(weights[5], 0.0);
    }

    #[test]
    fn orientation_applies_periapsis_inclination_then_node() {
        let elements = OrbitalElements {
            a: 2.0,
            e: 0.0,
            i: std::f64::consts::FRAC_PI_2,
            ascending_node: std::f64::consts::FRAC_PI_2,
            periapsis_argument: std::f64::consts::FRAC_PI_2,
        };
        let points = conic_points(&elements, 8).unwrap();
        // Periapsis: +X -> (ω) +Y -> (i) +Z -> (Ω) +Z.
        assert!(points[0].abs_diff_eq(DVec3::new(0.0, 0.0, 2.0), 1e-12));
        // Quarter orbit: +Y -> (ω) -X -> (i) -X -> (Ω) -Y.
        assert!(points[2].abs_diff_eq(DVec3::new(0.0, -2.0, 0.0), 1e-12));
    }

    #[test]
    fn satellite_ring_is_centred_on_parent() {
        let parent = DVec3::new(5.0, 1.0, 0.0);
        let sample =
            OrbitSample::sample(Some(&circle()), parent, parent + DVec3::Y).unwrap();
        for p in &sample.points {
            assert_relative_eq!((*p - parent).length(), 1.0, epsilon = 1e-12);
        }
        // Quarter turn is index 256; band centre trails it by the lead offset.
        assert_eq!(sample.band_centre, 253);
    }

    #[test]
    fn degenerate_elements_are_omitted() {
        let mut elements = circle();
        elements.e = 1.0;
        assert!(OrbitSample::sample(Some(&elements), DVec3::ZERO, DVec3::X).is_none());
        elements.e = 1.7;
        assert!(OrbitSample::sample(Some(&elements), DVec3::ZERO, DVec3::X).is_none());
        elements.e = -0.1;
        assert!(OrbitSample::sample(Some(&elements), DVec3::ZERO, DVec3::X).is_none());
        elements.e = 0.5;
        elements.a = f64::NAN;
        assert!(OrbitSample::sample(Some(&elements), DVec3::ZERO, DVec3::X).is_none());
        assert!(OrbitSample::sample(None, DVec3::ZERO, DVec3::X).is_none());
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let points = vec![DVec3::X, DVec3::NEG_X, DVec3::X];
        assert_eq!(nearest_index(&points, DVec3::Y), 0);
    }

    proptest! {
        #[test]
        fn ring_is_closed_for_valid_elements(
            a in 0.01f64..40.0,
            e in 0.0f64..0.95,
            i in 0.0f64..std::f64::consts::PI,
            node in 0.0f64..TAU,
            peri in 0.0f64..TAU,
        ) {
            let elements = OrbitalElements { a, e, i, ascending_node: node, periapsis_argument: peri };
            let sample = OrbitSample::sample(Some(&elements), DVec3::ZERO, DVec3::ZERO).unwrap();
            prop_assert_eq!(sample.points[0], sample.points[ORBIT_SAMPLES]);
        }

        #[test]
        fn band_is_half_ring_and_contiguous(
            x in -3.0f64..3.0,
            y in -3.0f64..3.0,
            z in -1.0f64..1.0,
        ) {
            let sample = OrbitSample::sample(Some(&circle()), DVec3::ZERO, DVec3::new(x, y, z)).unwrap();
            let lit = full_weight_indices(&sample.weights);
            prop_assert_eq!(lit.len(), ORBIT_SAMPLES / 2 + 1);
            prop_assert!(is_contiguous_on_ring(&lit, ORBIT_SAMPLES + 1));
            prop_assert!(sample.weights.iter().all(|w| (0.0..=1.0).contains(w)));
        }
    }
}
