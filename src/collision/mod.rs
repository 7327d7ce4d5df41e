//! Pairwise collision detection and the outcome policy.
//!
//! Detection is a circle overlap test, widened for dust pairs. The policy then
//! picks one outcome per detected pair: energy against a mass-scaled threshold
//! decides destructive vs. merge, and the mass ratio decides crater vs.
//! fragment among destructive collisions.

pub mod resolve;

pub use resolve::{crater, fragment, merge, split_debris};

use crate::body::Body;
use crate::sim::SimSettings;

/// Which body of a pair plays a role.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    /// The body whose turn it is.
    This,
    /// The body it ran into.
    Other,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// `This` absorbs `Other`.
    Merge,
    /// The heavier body survives, eroded; `impactor` is destroyed.
    Crater { target: Side },
    /// Both are destroyed and replaced by debris.
    Fragment,
}

/// Both bodies may take part in a collision.
pub fn can_collide(a: &Body, b: &Body) -> bool {
    !a.is_cooling_down() && !b.is_cooling_down()
}

/// Sum of radii, widened when both bodies are dust.
pub fn contact_distance(a: &Body, b: &Body, settings: &SimSettings) -> f32 {
    let base = a.radius() + b.radius();
    if settings.is_dust(a.mass()) && settings.is_dust(b.mass()) {
        base * settings.dust_accretion_radius_multiplier
    } else {
        base
    }
}

pub fn overlaps(a: &Body, b: &Body, settings: &SimSettings) -> bool {
    let min = contact_distance(a, b, settings);
    (b.pos - a.pos).length_squared() < min * min
}

/// Energy per unit of combined mass above which a collision is destructive,
/// or `None` when the pair must not interact at all (hot dust never sticks).
pub fn energy_threshold(a: &Body, b: &Body, settings: &SimSettings) -> Option<f32> {
    let mut threshold = settings.collision_energy_threshold;
    let large = settings.dust_mass_threshold * settings.large_body_factor;

    if settings.is_dust(a.mass()) && settings.is_dust(b.mass()) {
        if a.temperature() + b.temperature() > settings.hot_dust_temperature {
            return None;
        }
        threshold *= settings.dust_threshold_multiplier;
    } else if a.mass() > large && b.mass() > large {
        threshold /= (a.mass() + b.mass()) / settings.large_body_mass_scale;
    }
    Some(threshold)
}

/// Decide what happens when `this` meets `other`. `None` means the pair is
/// left alone this tick.
pub fn decide(this: &Body, other: &Body, settings: &SimSettings) -> Option<Outcome> {
    let threshold = energy_threshold(this, other, settings)?;
    let energy = this.kinetic_energy() + other.kinetic_energy();

    if energy <= threshold * (this.mass() + other.mass()) {
        return Some(Outcome::Merge);
    }

    let ratio = this.mass() / other.mass();
    let outcome = if ratio > settings.destructive_mass_ratio {
        Outcome::Crater { target: Side::This }
    } else if ratio < settings.destructive_mass_ratio.recip() {
        Outcome::Crater { target: Side::Other }
    } else {
        Outcome::Fragment
    };
    Some(outcome)
}
