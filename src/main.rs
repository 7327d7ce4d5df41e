use std::fs::File;
use std::path::PathBuf;

use accrete_rs::{
    Bounds, PopulationConfig, Preset, ScenarioConfig, SimPlugin, SimSettings, SimStats,
    SpawnDistribution,
};
use anyhow::{Context, Result};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetArg {
    Classic,
    Jets,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Classic => Preset::Classic,
            PresetArg::Jets => Preset::Jets,
        }
    }
}

/// Run the body simulation headless and log how the population evolves.
#[derive(Parser, Debug)]
struct Args {
    /// Scenario YAML; overrides the size, preset and count flags.
    #[arg(short, long)]
    scenario: Option<PathBuf>,
    #[arg(long, default_value_t = 1200.0)]
    width: f32,
    #[arg(long, default_value_t = 800.0)]
    height: f32,
    #[arg(short, long, default_value_t = 300)]
    count: usize,
    #[arg(short, long, value_enum, default_value_t = PresetArg::Classic)]
    preset: PresetArg,
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many ticks.
    #[arg(short, long, default_value_t = 3_000)]
    ticks: u64,
    /// Log a summary every this many ticks.
    #[arg(long, default_value_t = 250)]
    report_every: u64,
}

#[derive(Resource)]
struct RunLimits {
    ticks: u64,
    report_every: u64,
}

fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    if let Some(path) = &args.scenario {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        return ScenarioConfig::from_reader(file)
            .with_context(|| format!("loading {}", path.display()));
    }

    let mut settings = SimSettings::from_preset(args.preset.into());
    settings.seed = args.seed;
    Ok(ScenarioConfig {
        bounds: Bounds::new(args.width, args.height)?,
        settings,
        population: Some(PopulationConfig {
            count: args.count,
            distribution: SpawnDistribution::default(),
        }),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let scenario = load_scenario(&args)?;
    let plugin = SimPlugin::from_scenario(scenario).context("invalid scenario")?;

    let exit = App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin::default())
        .add_plugins(plugin)
        .insert_resource(RunLimits {
            ticks: args.ticks,
            report_every: args.report_every.max(1),
        })
        .add_systems(PostUpdate, report_progress)
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("simulation exited with code {code}"),
    }
}

fn report_progress(
    stats: Res<SimStats>,
    limits: Res<RunLimits>,
    mut exit: EventWriter<AppExit>,
) {
    if !stats.is_changed() {
        return;
    }
    if stats.tick % limits.report_every == 0 || stats.tick >= limits.ticks {
        info!(
            "tick {}: {} bodies, total mass {:.1}",
            stats.tick, stats.population, stats.total_mass
        );
    }
    if stats.tick >= limits.ticks {
        exit.send(AppExit::Success);
    }
}
