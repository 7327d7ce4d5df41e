use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a comparable-mass collision scatters its debris.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentationMode {
    /// Every fragment leaves in a uniformly random direction.
    #[default]
    Uniform,
    /// A minority of fragments is thrown along the line perpendicular to the
    /// collision normal at elevated speed, the rest scatter uniformly.
    Jets {
        jet_fraction: f32,
        jet_speed: f32,
        scatter_speed: f32,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Classic,
    Jets,
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub g: f32,
    pub base_density: f32,
    pub specific_heat: f32,
    pub cooling_rate: f32,
    pub radiation_transfer_rate: f32,
    pub gas_drag_coefficient: f32,

    pub dust_mass_threshold: f32,
    pub dust_accretion_radius_multiplier: f32,
    pub dust_threshold_multiplier: f32,
    /// Dust pairs whose summed temperature exceeds this never collide.
    pub hot_dust_temperature: f32,

    pub collision_energy_threshold: f32,
    /// Both bodies above `dust_mass_threshold * large_body_factor` count as large.
    pub large_body_factor: f32,
    pub large_body_mass_scale: f32,
    pub destructive_mass_ratio: f32,
    pub heat_loss_ratio: f32,

    pub excavation_energy_scale: f32,
    pub excavation_efficiency: f32,
    pub max_excavation_fraction: f32,
    pub crater_mass_per_fragment: f32,
    pub crater_min_fragments: usize,
    pub crater_spread: f32,
    pub crater_spawn_offset: f32,
    pub impact_heat_bias: f32,
    pub recoil_factor: f32,

    pub fragment_mass_per_piece: f32,
    pub fragment_min_pieces: usize,
    pub fragment_spawn_radius_factor: f32,
    pub fragmentation: FragmentationMode,

    pub negligible_mass: f32,
    pub spawn_cooldown: u32,
    pub initial_speed: f32,
    pub gravity_respects_cooldown: bool,

    pub running: bool,
    /// Spawn requests from the host stop once this many bodies are live.
    pub spawn_limit: usize,
    pub seed: Option<u64>,
    pub preset: Preset,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            g: 0.02,
            base_density: 50.0,
            specific_heat: 4.2,
            cooling_rate: 0.005,
            radiation_transfer_rate: 0.0001,
            gas_drag_coefficient: 0.005,
            dust_mass_threshold: 50.0,
            dust_accretion_radius_multiplier: 4.0,
            dust_threshold_multiplier: 20.0,
            hot_dust_temperature: 100.0,
            collision_energy_threshold: 30.0,
            large_body_factor: 10.0,
            large_body_mass_scale: 2000.0,
            destructive_mass_ratio: 4.0,
            heat_loss_ratio: 0.95,
            excavation_energy_scale: 50.0,
            excavation_efficiency: 0.8,
            max_excavation_fraction: 0.15,
            crater_mass_per_fragment: 5.0,
            crater_min_fragments: 3,
            crater_spread: 1.0,
            crater_spawn_offset: 2.0,
            impact_heat_bias: 50.0,
            recoil_factor: 0.2,
            fragment_mass_per_piece: 10.0,
            fragment_min_pieces: 2,
            fragment_spawn_radius_factor: 1.5,
            fragmentation: FragmentationMode::Uniform,
            negligible_mass: 0.1,
            spawn_cooldown: 5,
            initial_speed: 1.0,
            gravity_respects_cooldown: false,
            running: true,
            spawn_limit: 2_000,
            seed: None,
            preset: Preset::Classic,
        }
    }
}

impl SimSettings {
    pub fn from_preset(preset: Preset) -> Self {
        let mut settings = SimSettings::default();
        settings.preset = preset;
        match preset {
            Preset::Classic => {
                settings.gravity_respects_cooldown = false;
                settings.heat_loss_ratio = 0.95;
                settings.fragmentation = FragmentationMode::Uniform;
                settings.spawn_cooldown = 5;
            }
            Preset::Jets => {
                settings.gravity_respects_cooldown = true;
                settings.heat_loss_ratio = 0.8;
                settings.fragmentation = FragmentationMode::Jets {
                    jet_fraction: 0.2,
                    jet_speed: 3.0,
                    scatter_speed: 1.0,
                };
                settings.spawn_cooldown = 10;
            }
        }
        settings
    }

    pub fn is_dust(&self, mass: f32) -> bool {
        mass < self.dust_mass_threshold
    }

    /// Rejects values that would break the body invariants downstream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("base_density", self.base_density),
            ("dust_mass_threshold", self.dust_mass_threshold),
            ("large_body_mass_scale", self.large_body_mass_scale),
            ("destructive_mass_ratio", self.destructive_mass_ratio),
            ("excavation_energy_scale", self.excavation_energy_scale),
            ("crater_mass_per_fragment", self.crater_mass_per_fragment),
            ("fragment_mass_per_piece", self.fragment_mass_per_piece),
            ("specific_heat", self.specific_heat),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSetting { name, value });
            }
        }
        let fractions = [
            ("cooling_rate", self.cooling_rate),
            ("heat_loss_ratio", self.heat_loss_ratio),
            ("max_excavation_fraction", self.max_excavation_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidSetting { name, value });
            }
        }
        if let FragmentationMode::Jets { jet_fraction, .. } = self.fragmentation {
            if !(0.0..=1.0).contains(&jet_fraction) {
                return Err(ConfigError::InvalidSetting {
                    name: "jet_fraction",
                    value: jet_fraction,
                });
            }
        }
        Ok(())
    }
}
