//! The body container and the tick loop.
//!
//! Bodies live in a slot arena addressed by [`BodyId`]. A tick snapshots the
//! ids up front and skips any that were vacated earlier in the same pass, so
//! a body consumed by a collision is never read or processed again. Debris
//! created during the pass waits in `pending` and only joins the arena once
//! the pass is over.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::body::{Body, BodyId, BodyView};
use crate::collision::{self, Outcome, Side};
use crate::config::{Bounds, SpawnDistribution};
use crate::error::{ConfigError, SpawnError};
use crate::physics;
use crate::sim::SimSettings;

/// A spawn request. Anything left unset takes the universe's defaults: a
/// small random velocity, the base density, zero temperature and the spawn
/// cooldown.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpawnRequest {
    pub pos: Vec2,
    pub mass: f32,
    pub vel: Option<Vec2>,
    pub temperature: Option<f32>,
    pub density: Option<f32>,
    pub cooldown: Option<u32>,
}

impl SpawnRequest {
    pub fn new(pos: Vec2, mass: f32) -> Self {
        Self {
            pos,
            mass,
            vel: None,
            temperature: None,
            density: None,
            cooldown: None,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = Some(vel);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = Some(cooldown);
        self
    }
}

/// What happened during the last tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TickReport {
    pub merges: usize,
    pub craters: usize,
    pub fragmentations: usize,
    pub debris_spawned: usize,
    /// Overlaps between dust too hot to stick, left alone. A pair is met
    /// once from each side, so one hot pair counts twice.
    pub hot_dust_skipped: usize,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

#[derive(Resource, Clone)]
pub struct Universe {
    bounds: Bounds,
    settings: SimSettings,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    pending: Vec<Body>,
    rng: StdRng,
    tick: u64,
    report: TickReport,
}

impl Universe {
    pub fn new(bounds: Bounds, settings: SimSettings) -> Result<Self, ConfigError> {
        bounds.validate()?;
        settings.validate()?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            bounds,
            settings,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            pending: Vec::new(),
            rng,
            tick: 0,
            report: TickReport::default(),
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Swap in new tunables. The random stream is kept unless the seed changed.
    pub fn set_settings(&mut self, settings: SimSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        if settings.seed != self.settings.seed {
            if let Some(seed) = settings.seed {
                self.rng = StdRng::seed_from_u64(seed);
            }
        }
        self.settings = settings;
        Ok(())
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn last_report(&self) -> TickReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|_| BodyId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                let id = BodyId {
                    index: index as u32,
                    generation: slot.generation,
                };
                (id, body)
            })
        })
    }

    /// Read-only view of every live body, for drawing.
    pub fn bodies(&self) -> impl Iterator<Item = BodyView> + '_ {
        self.iter().map(|(id, body)| BodyView {
            id,
            pos: body.pos,
            vel: body.vel,
            radius: body.radius(),
            mass: body.mass(),
            temperature: body.temperature(),
            is_dust: self.settings.is_dust(body.mass()),
        })
    }

    pub fn total_mass(&self) -> f32 {
        self.iter().map(|(_, body)| body.mass()).sum()
    }

    /// Drop every body, live and pending, and restart the tick count.
    /// Handles taken before the clear stay dead.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.body.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.pending.clear();
        self.live = 0;
        self.tick = 0;
        self.report = TickReport::default();
    }

    fn insert(&mut self, body: Body) -> BodyId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    fn remove(&mut self, id: BodyId) -> Option<Body> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(body)
    }

    /// Add one body. Mass and density must be positive.
    pub fn spawn(&mut self, request: SpawnRequest) -> Result<BodyId, SpawnError> {
        let body = self.build(request)?;
        Ok(self.insert(body))
    }

    fn build(&mut self, request: SpawnRequest) -> Result<Body, SpawnError> {
        let vel = match request.vel {
            Some(vel) => vel,
            None => self.random_drift(),
        };
        let density = request.density.unwrap_or(self.settings.base_density);
        Ok(Body::new(request.pos, vel, request.mass, density)?
            .with_temperature(request.temperature.unwrap_or(0.0))
            .with_cooldown(request.cooldown.unwrap_or(self.settings.spawn_cooldown)))
    }

    /// Add `count` bodies placed uniformly over the domain with masses drawn
    /// from `distribution`. Either every body is added or none is.
    pub fn spawn_many(
        &mut self,
        count: usize,
        distribution: &SpawnDistribution,
    ) -> Result<Vec<BodyId>, SpawnError> {
        distribution.validate()?;
        let bodies = (0..count)
            .map(|_| {
                let pos = Vec2::new(
                    self.rng.gen::<f32>() * self.bounds.width,
                    self.rng.gen::<f32>() * self.bounds.height,
                );
                let mass = distribution.mass_from_unit(self.rng.gen::<f32>());
                self.build(SpawnRequest::new(pos, mass).with_temperature(distribution.temperature))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bodies.into_iter().map(|body| self.insert(body)).collect())
    }

    fn random_drift(&mut self) -> Vec2 {
        let speed = self.settings.initial_speed;
        Vec2::new(
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
        ) * speed
    }

    /// Run one full simulation step.
    pub fn advance_tick(&mut self) {
        self.report = TickReport::default();

        let snapshot: Vec<BodyId> = self.ids().collect();
        for id in snapshot {
            if !self.contains(id) {
                continue;
            }
            self.step_body(id);
        }

        self.report.debris_spawned = self.pending.len();
        for body in std::mem::take(&mut self.pending) {
            self.insert(body);
        }
        self.tick += 1;

        if self.report != TickReport::default() {
            trace!("tick {}: {:?}, {} bodies", self.tick, self.report, self.live);
        }
    }

    fn step_body(&mut self, id: BodyId) {
        let settings = &self.settings;
        let Some(mut body) = self.get(id).copied() else {
            return;
        };

        body.tick_cooldown();
        physics::apply_cooling(&mut body, settings);
        physics::apply_drag(&mut body, settings);

        body.acc = Vec2::ZERO;
        if !(settings.gravity_respects_cooldown && body.is_cooling_down()) {
            let others = self
                .iter()
                .filter(|&(other_id, other)| {
                    other_id != id
                        && !(settings.gravity_respects_cooldown && other.is_cooling_down())
                })
                .map(|(_, other)| other);
            let influence = physics::accumulate(&body, others, settings);
            body.acc = influence.acc;
            body.set_temperature(body.temperature() + influence.heat);
        }

        physics::integrate(&mut body);

        if let Some(slot) = self.get_mut(id) {
            *slot = body;
        }

        self.collide(id);

        let bounds = self.bounds;
        if let Some(body) = self.get_mut(id) {
            physics::reflect(body, &bounds);
        }
    }

    /// Check `id` against every other live body and resolve the first
    /// collision found. At most one outcome is applied per body per turn.
    fn collide(&mut self, id: BodyId) {
        let Some(&this) = self.get(id) else {
            return;
        };

        let mut hit = None;
        let mut skipped = 0;
        for (other_id, other) in self.iter() {
            if other_id == id || !collision::can_collide(&this, other) {
                continue;
            }
            if !collision::overlaps(&this, other, &self.settings) {
                continue;
            }
            match collision::decide(&this, other, &self.settings) {
                Some(outcome) => {
                    hit = Some((other_id, outcome));
                    break;
                }
                None => skipped += 1,
            }
        }
        self.report.hot_dust_skipped += skipped;

        if let Some((other_id, outcome)) = hit {
            self.apply(id, other_id, outcome);
        }
    }

    fn apply(&mut self, this_id: BodyId, other_id: BodyId, outcome: Outcome) {
        let (Some(&this), Some(&other)) = (self.get(this_id), self.get(other_id)) else {
            return;
        };

        match outcome {
            Outcome::Merge => {
                let mut survivor = this;
                collision::merge(&mut survivor, &other, &self.settings);
                self.remove(other_id);
                if let Some(slot) = self.get_mut(this_id) {
                    *slot = survivor;
                }
                self.report.merges += 1;
                debug!(
                    "merge: {:.2} + {:.2} -> {:.2}",
                    this.mass(),
                    other.mass(),
                    survivor.mass()
                );
            }
            Outcome::Crater { target: side } => {
                let (target_id, mut target, impactor_id, impactor) = match side {
                    Side::This => (this_id, this, other_id, other),
                    Side::Other => (other_id, other, this_id, this),
                };
                let mass_before = target.mass();
                let debris =
                    collision::crater(&mut target, &impactor, &self.settings, &mut self.rng);
                self.remove(impactor_id);
                if let Some(slot) = self.get_mut(target_id) {
                    *slot = target;
                }
                self.report.craters += 1;
                debug!(
                    "crater: {:.2} struck by {:.2}, lost {:.3}, {} debris",
                    mass_before,
                    impactor.mass(),
                    mass_before - target.mass(),
                    debris.len()
                );
                self.pending.extend(debris);
            }
            Outcome::Fragment => {
                let debris = collision::fragment(&this, &other, &self.settings, &mut self.rng);
                self.remove(this_id);
                self.remove(other_id);
                self.report.fragmentations += 1;
                debug!(
                    "fragment: {:.2} + {:.2} -> {} pieces",
                    this.mass(),
                    other.mass(),
                    debris.len()
                );
                self.pending.extend(debris);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(settings: SimSettings) -> Universe {
        Universe::new(
            Bounds {
                width: 800.0,
                height: 600.0,
            },
            SimSettings {
                seed: Some(11),
                ..settings
            },
        )
        .unwrap()
    }

    fn still(x: f32, y: f32, mass: f32) -> SpawnRequest {
        SpawnRequest::new(Vec2::new(x, y), mass)
            .with_velocity(Vec2::ZERO)
            .with_cooldown(0)
    }

    #[test]
    fn rejects_invalid_spawns() {
        let mut u = universe(default());
        assert_eq!(
            u.spawn(still(1.0, 1.0, 0.0)),
            Err(SpawnError::InvalidMass(0.0))
        );
        assert_eq!(
            u.spawn(still(1.0, 1.0, 3.0).with_density(-1.0)),
            Err(SpawnError::InvalidDensity(-1.0))
        );
        assert!(u.is_empty());
    }

    #[test]
    fn rejects_invalid_bounds() {
        assert!(matches!(
            Universe::new(
                Bounds {
                    width: 0.0,
                    height: 10.0
                },
                default()
            ),
            Err(ConfigError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn spawn_applies_defaults() {
        let mut u = universe(default());
        let id = u.spawn(SpawnRequest::new(Vec2::new(5.0, 5.0), 20.0)).unwrap();
        let b = u.get(id).unwrap();
        assert_eq!(b.density(), 50.0);
        assert_eq!(b.cooldown(), 5);
        assert_eq!(b.temperature(), 0.0);
        assert!(b.vel.x.abs() <= 1.0 && b.vel.y.abs() <= 1.0);
    }

    #[test]
    fn stale_handles_do_not_alias() {
        let mut u = universe(default());
        let a = u.spawn(still(1.0, 1.0, 1.0)).unwrap();
        u.remove(a);
        let b = u.spawn(still(2.0, 2.0, 2.0)).unwrap();
        assert_eq!(a.index, b.index);
        assert!(!u.contains(a));
        assert!(u.contains(b));
        assert_eq!(u.len(), 1);
    }

    #[test]
    fn handles_do_not_survive_a_clear() {
        let mut u = universe(default());
        let old = u.spawn(still(1.0, 1.0, 7.0)).unwrap();
        u.clear();
        let new = u.spawn(still(2.0, 2.0, 99.0)).unwrap();
        assert!(!u.contains(old));
        assert_eq!(u.get(old), None);
        assert_eq!(u.get(new).unwrap().mass(), 99.0);
        assert_eq!(u.len(), 1);
    }

    #[test]
    fn clear_restarts_the_tick_count() {
        let mut u = universe(default());
        u.spawn_many(5, &SpawnDistribution::default()).unwrap();
        u.advance_tick();
        u.advance_tick();
        u.clear();
        assert_eq!(u.tick(), 0);
        assert_eq!(u.last_report(), TickReport::default());
    }

    #[test]
    fn bad_distribution_spawns_nothing() {
        let mut u = universe(default());
        let bad = SpawnDistribution {
            mass_min: -5.0,
            ..SpawnDistribution::default()
        };
        assert!(matches!(
            u.spawn_many(50, &bad),
            Err(SpawnError::InvalidDistribution { name: "mass_min", .. })
        ));
        assert!(u.is_empty());
    }

    #[test]
    fn spawn_many_fills_the_domain() {
        let mut u = universe(default());
        let ids = u.spawn_many(200, &SpawnDistribution::default()).unwrap();
        assert_eq!(ids.len(), 200);
        for view in u.bodies() {
            assert!((0.0..800.0).contains(&view.pos.x));
            assert!((0.0..600.0).contains(&view.pos.y));
            assert!((10.0..110.0).contains(&view.mass));
            assert_eq!(view.temperature, 10.0);
        }
    }

    #[test]
    fn debris_waits_until_the_tick_ends() {
        let mut u = universe(SimSettings {
            g: 0.0,
            ..default()
        });
        u.spawn(still(400.0, 300.0, 100.0).with_velocity(Vec2::new(20.0, 0.0)))
            .unwrap();
        u.spawn(still(421.0, 300.0, 100.0).with_velocity(Vec2::new(-1.0, 0.0)))
            .unwrap();

        // drive the pass by hand to look inside it
        let snapshot: Vec<BodyId> = u.ids().collect();
        u.step_body(snapshot[0]);
        assert!(u.is_empty());
        assert!(!u.pending.is_empty());
        // the second parent is gone and must be skipped
        assert!(!u.contains(snapshot[1]));
    }

    #[test]
    fn fresh_debris_is_not_processed_in_its_own_tick() {
        let mut u = universe(SimSettings {
            g: 0.0,
            ..default()
        });
        u.spawn(still(400.0, 300.0, 100.0).with_velocity(Vec2::new(20.0, 0.0)))
            .unwrap();
        u.spawn(still(421.0, 300.0, 100.0).with_velocity(Vec2::new(-1.0, 0.0)))
            .unwrap();
        u.advance_tick();

        let report = u.last_report();
        assert_eq!(report.fragmentations, 1);
        assert_eq!(report.debris_spawned, u.len());
        // untouched cooldowns show no debris took a turn
        for id in u.ids().collect::<Vec<_>>() {
            assert_eq!(u.get(id).unwrap().cooldown(), u.settings().spawn_cooldown);
        }
        assert!((u.total_mass() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn cooling_down_bodies_do_not_collide() {
        let mut u = universe(SimSettings {
            g: 0.0,
            ..default()
        });
        u.spawn(still(400.0, 300.0, 100.0).with_cooldown(10)).unwrap();
        u.spawn(still(400.5, 300.0, 100.0).with_cooldown(10)).unwrap();
        for _ in 0..5 {
            u.advance_tick();
        }
        assert_eq!(u.len(), 2);
    }

    #[test]
    fn gated_gravity_ignores_cooling_bodies() {
        let mut u = universe(SimSettings {
            gravity_respects_cooldown: true,
            ..default()
        });
        let a = u.spawn(still(100.0, 300.0, 100.0)).unwrap();
        let b = u.spawn(still(200.0, 300.0, 1000.0).with_cooldown(50)).unwrap();
        u.advance_tick();
        assert_eq!(u.get(a).unwrap().vel, Vec2::ZERO);
        assert_eq!(u.get(b).unwrap().vel, Vec2::ZERO);

        let mut ungated = universe(default());
        let a = ungated.spawn(still(100.0, 300.0, 100.0)).unwrap();
        ungated
            .spawn(still(200.0, 300.0, 1000.0).with_cooldown(50))
            .unwrap();
        ungated.advance_tick();
        assert!(ungated.get(a).unwrap().vel.x > 0.0);
    }

    #[test]
    fn hot_dust_is_left_alone_and_counted_from_each_side() {
        let mut u = universe(SimSettings {
            g: 0.0,
            ..default()
        });
        u.spawn(still(400.0, 300.0, 5.0).with_temperature(80.0)).unwrap();
        u.spawn(still(400.5, 300.0, 5.0).with_temperature(80.0)).unwrap();
        u.advance_tick();
        assert_eq!(u.len(), 2);
        // one pair, met on both bodies' turns
        assert_eq!(u.last_report().hot_dust_skipped, 2);
    }

    #[test]
    fn clear_empties_everything() {
        let mut u = universe(default());
        u.spawn_many(10, &SpawnDistribution::default()).unwrap();
        u.clear();
        assert!(u.is_empty());
        assert_eq!(u.bodies().count(), 0);
        u.advance_tick();
        assert!(u.is_empty());
    }
}
