//! Direct pairwise gravity and radiative heating.
//!
//! One body is evaluated against every other live body, so a full tick is
//! O(n²). That is fine for the few hundred bodies this engine targets.

use bevy::prelude::*;

use crate::body::Body;
use crate::sim::SimSettings;

/// What the rest of the universe does to one body during a tick.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Influence {
    pub acc: Vec2,
    /// Temperature gained from neighbours' radiation.
    pub heat: f32,
}

/// Sum gravitational acceleration and received radiation on `body`.
///
/// `others` must not contain `body` itself. Coincident bodies contribute
/// nothing; closer than one unit the distance is clamped to one.
pub fn accumulate<'a>(
    body: &Body,
    others: impl IntoIterator<Item = &'a Body>,
    settings: &SimSettings,
) -> Influence {
    let mut influence = Influence::default();
    for other in others {
        let delta = other.pos - body.pos;
        let dist2 = delta.length_squared();
        if dist2 == 0.0 {
            continue;
        }
        let dist = dist2.sqrt();
        let clamped = dist.max(1.0);
        let clamped2 = clamped * clamped;

        // a = G * M / d² along the unit displacement
        influence.acc += delta / dist * (settings.g * other.mass() / clamped2);

        // emitting area ~ r²
        let emitted = other.temperature() * other.radius() * other.radius();
        influence.heat += emitted * settings.radiation_transfer_rate / clamped2 / body.mass();
    }
    influence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, mass: f32) -> Body {
        Body::new(Vec2::new(x, 0.0), Vec2::ZERO, mass, 50.0).unwrap()
    }

    #[test]
    fn pulls_toward_other_body() {
        let settings = SimSettings::default();
        let a = at(0.0, 10.0);
        let b = at(10.0, 100.0);
        let inf = accumulate(&a, [&b], &settings);
        assert!(inf.acc.x > 0.0);
        assert_eq!(inf.acc.y, 0.0);
        assert!((inf.acc.x - 0.02 * 100.0 / 100.0).abs() < 1e-7);
    }

    #[test]
    fn inverse_square() {
        let settings = SimSettings::default();
        let a = at(0.0, 1.0);
        let near = accumulate(&a, [&at(5.0, 1.0)], &settings).acc.length();
        let far = accumulate(&a, [&at(10.0, 1.0)], &settings).acc.length();
        assert!((near / far - 4.0).abs() < 1e-3, "ratio {}", near / far);
    }

    #[test]
    fn acceleration_is_independent_of_own_mass() {
        let settings = SimSettings::default();
        let other = at(7.0, 30.0);
        let light = accumulate(&at(0.0, 1.0), [&other], &settings).acc;
        let heavy = accumulate(&at(0.0, 900.0), [&other], &settings).acc;
        assert!((light - heavy).length() < 1e-7);
    }

    #[test]
    fn coincident_bodies_are_skipped() {
        let settings = SimSettings::default();
        let inf = accumulate(&at(3.0, 1.0), [&at(3.0, 1.0).with_temperature(100.0)], &settings);
        assert_eq!(inf, Influence::default());
    }

    #[test]
    fn close_range_is_clamped() {
        let settings = SimSettings::default();
        let a = at(0.0, 1.0);
        let inf = accumulate(&a, [&at(0.01, 50.0)], &settings);
        assert!((inf.acc.length() - 0.02 * 50.0).abs() < 1e-5);
    }

    #[test]
    fn hot_neighbour_radiates_heat() {
        let settings = SimSettings::default();
        let a = at(0.0, 2.0);
        let sun = at(10.0, 5000.0).with_temperature(200.0);
        let inf = accumulate(&a, [&sun], &settings);
        let expected = 200.0 * sun.radius() * sun.radius() * 0.0001 / 100.0 / 2.0;
        assert!((inf.heat - expected).abs() < 1e-6);

        let cold = accumulate(&a, [&at(10.0, 5000.0)], &settings);
        assert_eq!(cold.heat, 0.0);
    }

    #[test]
    fn close_range_heat_is_clamped() {
        let settings = SimSettings::default();
        let a = at(0.0, 2.0);
        let hot = at(0.01, 20.0).with_temperature(90.0);
        let touching = accumulate(&a, [&hot], &settings);
        let expected = 90.0 * hot.radius() * hot.radius() * 0.0001 / 2.0;
        assert!((touching.heat - expected).abs() < 1e-6);

        let one_unit = accumulate(&a, [&at(1.0, 20.0).with_temperature(90.0)], &settings);
        assert!((touching.heat - one_unit.heat).abs() < 1e-6);
    }
}
