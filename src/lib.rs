//! A 2-D population of massive bodies under gravity, radiative heating and
//! gas drag, whose collisions merge, crater or shatter them.
//!
//! [`Universe`] owns the bodies and advances them one tick at a time;
//! [`SimPlugin`] hosts it inside a Bevy app.

pub mod body;
pub mod collision;
pub mod config;
pub mod error;
pub mod physics;
pub mod sim;
pub mod universe;

pub use body::{Body, BodyId, BodyView};
pub use config::{Bounds, PopulationConfig, ScenarioConfig, SpawnDistribution};
pub use error::{ConfigError, SpawnError};
pub use sim::{
    FragmentationMode, Preset, ResetEvent, SimPlugin, SimSettings, SimStats, SpawnBodies,
    SpawnBody,
};
pub use universe::{SpawnRequest, TickReport, Universe};
