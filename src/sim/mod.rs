//! Bevy integration: the [`Universe`] as a resource, ticked once per frame.
//!
//! Drawing is left to the host app, which reads bodies through
//! [`Universe::bodies`] and asks for new ones with [`SpawnBody`] /
//! [`SpawnBodies`].

mod settings;

pub use settings::{FragmentationMode, Preset, SimSettings};

use bevy::prelude::*;

use crate::config::{Bounds, PopulationConfig, ScenarioConfig, SpawnDistribution};
use crate::error::ConfigError;
use crate::universe::{SpawnRequest, TickReport, Universe};

#[derive(Event, Clone, Copy, Debug)]
pub struct SpawnBody(pub SpawnRequest);

#[derive(Event, Clone, Copy, Debug)]
pub struct SpawnBodies {
    pub count: usize,
    pub distribution: SpawnDistribution,
}

/// Drop every body and reseed the initial population.
#[derive(Event, Default)]
pub struct ResetEvent;

#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct SimStats {
    pub population: usize,
    pub total_mass: f32,
    pub tick: u64,
    pub last: TickReport,
}

#[derive(Resource, Clone, Copy, Debug, Default)]
struct InitialPopulation(Option<PopulationConfig>);

pub struct SimPlugin {
    settings: SimSettings,
    population: Option<PopulationConfig>,
    universe: Universe,
}

impl SimPlugin {
    pub fn new(
        bounds: Bounds,
        settings: SimSettings,
        population: Option<PopulationConfig>,
    ) -> Result<Self, ConfigError> {
        if let Some(population) = &population {
            population.distribution.validate()?;
        }
        let mut universe = Universe::new(bounds, settings.clone())?;
        seed_population(&mut universe, population);
        Ok(Self {
            settings,
            population,
            universe,
        })
    }

    pub fn from_scenario(config: ScenarioConfig) -> Result<Self, ConfigError> {
        Self::new(config.bounds, config.settings, config.population)
    }
}

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .insert_resource(self.universe.clone())
            .insert_resource(InitialPopulation(self.population))
            .init_resource::<SimStats>()
            .add_event::<SpawnBody>()
            .add_event::<SpawnBodies>()
            .add_event::<ResetEvent>()
            .add_systems(
                Update,
                (
                    handle_reset,
                    spawn_requests,
                    sync_settings,
                    advance_universe,
                    update_stats,
                )
                    .chain(),
            );
    }
}

fn seed_population(universe: &mut Universe, population: Option<PopulationConfig>) {
    let Some(population) = population else {
        return;
    };
    match universe.spawn_many(population.count, &population.distribution) {
        Ok(ids) => info!("seeded {} bodies", ids.len()),
        Err(err) => warn!("initial population rejected: {err}"),
    }
}

fn handle_reset(
    mut ev_reset: EventReader<ResetEvent>,
    mut universe: ResMut<Universe>,
    population: Res<InitialPopulation>,
) {
    if ev_reset.is_empty() {
        return;
    }
    ev_reset.clear();

    universe.clear();
    seed_population(&mut universe, population.0);
}

fn spawn_requests(
    mut ev_one: EventReader<SpawnBody>,
    mut ev_many: EventReader<SpawnBodies>,
    mut universe: ResMut<Universe>,
    settings: Res<SimSettings>,
) {
    for SpawnBody(request) in ev_one.read() {
        if universe.len() >= settings.spawn_limit {
            continue;
        }
        if let Err(err) = universe.spawn(*request) {
            warn!("spawn rejected: {err}");
        }
    }

    for e in ev_many.read() {
        let count = e.count.min(settings.spawn_limit.saturating_sub(universe.len()));
        if count == 0 {
            continue;
        }
        if let Err(err) = universe.spawn_many(count, &e.distribution) {
            warn!("spawn rejected: {err}");
        }
    }
}

fn sync_settings(settings: Res<SimSettings>, mut universe: ResMut<Universe>) {
    if !settings.is_changed() {
        return;
    }
    if let Err(err) = universe.set_settings(settings.clone()) {
        warn!("keeping previous settings: {err}");
    }
}

fn advance_universe(settings: Res<SimSettings>, mut universe: ResMut<Universe>) {
    if !settings.running {
        return;
    }
    universe.advance_tick();
}

fn update_stats(universe: Res<Universe>, mut stats: ResMut<SimStats>) {
    if !universe.is_changed() {
        return;
    }
    *stats = SimStats {
        population: universe.len(),
        total_mass: universe.total_mass(),
        tick: universe.tick(),
        last: universe.last_report(),
    };
}
