//! The simulated body and its read-only view.
//!
//! Radius is never stored as a source of truth: every mutation of mass or
//! density goes through a setter that recomputes it as `sqrt(mass / density)`.

use bevy::prelude::*;

use crate::error::SpawnError;

/// Stable handle into a [`Universe`](crate::Universe).
///
/// The generation changes whenever the slot is vacated, so a handle taken
/// before a removal never aliases a later occupant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BodyId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Per-tick scratch value, overwritten by the gravity pass.
    pub acc: Vec2,
    mass: f32,
    density: f32,
    radius: f32,
    temperature: f32,
    cooldown: u32,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, mass: f32, density: f32) -> Result<Self, SpawnError> {
        check_mass(mass)?;
        check_density(density)?;
        Ok(Self {
            pos,
            vel,
            acc: Vec2::ZERO,
            mass,
            density,
            radius: radius_for(mass, density),
            temperature: 0.0,
            cooldown: 0,
        })
    }

    /// Debris constructor for masses the collision code has already checked.
    pub(crate) fn debris(
        pos: Vec2,
        vel: Vec2,
        mass: f32,
        density: f32,
        temperature: f32,
        cooldown: u32,
    ) -> Self {
        debug_assert!(mass > 0.0 && density > 0.0);
        Self {
            pos,
            vel,
            acc: Vec2::ZERO,
            mass,
            density,
            radius: radius_for(mass, density),
            temperature: temperature.max(0.0),
            cooldown,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.set_temperature(temperature);
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.vel.length_squared()
    }

    pub fn momentum(&self) -> Vec2 {
        self.vel * self.mass
    }

    /// Callers guarantee `mass > 0`; anything that could erode a body to
    /// nothing removes it instead.
    pub(crate) fn set_mass(&mut self, mass: f32) {
        debug_assert!(mass > 0.0, "body mass must stay positive, got {mass}");
        self.mass = mass;
        self.radius = radius_for(self.mass, self.density);
    }

    pub(crate) fn set_mass_and_density(&mut self, mass: f32, density: f32) {
        debug_assert!(mass > 0.0 && density > 0.0);
        self.mass = mass;
        self.density = density;
        self.radius = radius_for(self.mass, self.density);
    }

    pub(crate) fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature.max(0.0);
    }

    pub(crate) fn tick_cooldown(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown > 0
    }
}

pub fn radius_for(mass: f32, density: f32) -> f32 {
    (mass / density).sqrt()
}

fn check_mass(mass: f32) -> Result<(), SpawnError> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(SpawnError::InvalidMass(mass))
    }
}

fn check_density(density: f32) -> Result<(), SpawnError> {
    if density.is_finite() && density > 0.0 {
        Ok(())
    } else {
        Err(SpawnError::InvalidDensity(density))
    }
}

/// What the renderer gets to see of a body.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BodyView {
    pub id: BodyId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub temperature: f32,
    /// Below the dust threshold; drawn as a faint haze rather than a solid disc.
    pub is_dust: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_follows_mass_and_density() {
        let mut b = Body::new(Vec2::ZERO, Vec2::ZERO, 200.0, 50.0).unwrap();
        assert_eq!(b.radius(), (200.0f32 / 50.0).sqrt());
        b.set_mass(72.0);
        assert_eq!(b.radius(), (72.0f32 / 50.0).sqrt());
        b.set_mass_and_density(72.0, 8.0);
        assert_eq!(b.radius(), 3.0);
    }

    #[test]
    fn rejects_non_positive_mass_and_density() {
        assert_eq!(
            Body::new(Vec2::ZERO, Vec2::ZERO, 0.0, 50.0),
            Err(SpawnError::InvalidMass(0.0))
        );
        assert_eq!(
            Body::new(Vec2::ZERO, Vec2::ZERO, -3.0, 50.0),
            Err(SpawnError::InvalidMass(-3.0))
        );
        assert_eq!(
            Body::new(Vec2::ZERO, Vec2::ZERO, 1.0, 0.0),
            Err(SpawnError::InvalidDensity(0.0))
        );
        assert!(Body::new(Vec2::ZERO, Vec2::ZERO, f32::NAN, 50.0).is_err());
    }

    #[test]
    fn temperature_is_floored() {
        let b = Body::new(Vec2::ZERO, Vec2::ZERO, 1.0, 50.0)
            .unwrap()
            .with_temperature(-5.0);
        assert_eq!(b.temperature(), 0.0);
    }

    #[test]
    fn cooldown_counts_down_to_zero() {
        let mut b = Body::new(Vec2::ZERO, Vec2::ZERO, 1.0, 50.0)
            .unwrap()
            .with_cooldown(1);
        assert!(b.is_cooling_down());
        b.tick_cooldown();
        b.tick_cooldown();
        assert_eq!(b.cooldown(), 0);
    }
}
