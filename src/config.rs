//! Scenario files.
//!
//! A scenario names the rectangular domain, optionally overrides any of the
//! [`SimSettings`] defaults, and optionally seeds an initial population:
//!
//! ```yaml
//! bounds:
//!   width: 1200.0
//!   height: 800.0
//! settings:
//!   g: 0.02
//!   seed: 7
//! population:
//!   count: 300
//!   distribution:
//!     mass_min: 10.0
//!     mass_span: 100.0
//!     skew_exponent: 3
//!     temperature: 10.0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SpawnError};
use crate::sim::SimSettings;

/// The simulation domain, `[0, width] x [0, height]`. Required; there is no
/// sensible default canvas size.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        let bounds = Self { width, height };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(ConfigError::InvalidBounds {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Mass and temperature of randomly spawned bodies.
///
/// `mass = u^skew_exponent * mass_span + mass_min` with `u` uniform in
/// `[0, 1)`, so larger exponents bias the population toward small bodies.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnDistribution {
    pub mass_min: f32,
    pub mass_span: f32,
    pub skew_exponent: i32,
    pub temperature: f32,
}

impl Default for SpawnDistribution {
    fn default() -> Self {
        Self {
            mass_min: 10.0,
            mass_span: 100.0,
            skew_exponent: 3,
            temperature: 10.0,
        }
    }
}

impl SpawnDistribution {
    pub fn mass_from_unit(&self, u: f32) -> f32 {
        u.powi(self.skew_exponent) * self.mass_span + self.mass_min
    }

    /// Every draw must come out a valid body mass.
    pub fn validate(&self) -> Result<(), SpawnError> {
        let checks = [
            ("mass_min", self.mass_min, self.mass_min > 0.0),
            ("mass_span", self.mass_span, self.mass_span >= 0.0),
            ("temperature", self.temperature, self.temperature >= 0.0),
            (
                "skew_exponent",
                self.skew_exponent as f32,
                self.skew_exponent >= 0,
            ),
        ];
        for (name, value, ok) in checks {
            if !(ok && value.is_finite()) {
                return Err(SpawnError::InvalidDistribution { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub count: usize,
    #[serde(default)]
    pub distribution: SpawnDistribution,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub bounds: Bounds,
    #[serde(default)]
    pub settings: SimSettings,
    #[serde(default)]
    pub population: Option<PopulationConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ScenarioConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, ConfigError> {
        let config: ScenarioConfig = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate()?;
        self.settings.validate()?;
        if let Some(population) = &self.population {
            population.distribution.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_scenario() {
        let cfg = ScenarioConfig::from_yaml_str("bounds: { width: 800, height: 600 }\n").unwrap();
        assert_eq!(cfg.bounds, Bounds { width: 800.0, height: 600.0 });
        assert_eq!(cfg.settings, SimSettings::default());
        assert!(cfg.population.is_none());
    }

    #[test]
    fn parses_population_and_overrides() {
        let src = "\
bounds:
  width: 1200
  height: 800
settings:
  g: 0.1
  seed: 9
population:
  count: 42
";
        let cfg = ScenarioConfig::from_yaml_str(src).unwrap();
        assert_eq!(cfg.settings.g, 0.1);
        assert_eq!(cfg.settings.seed, Some(9));
        let pop = cfg.population.unwrap();
        assert_eq!(pop.count, 42);
        assert_eq!(pop.distribution, SpawnDistribution::default());
    }

    #[test]
    fn bounds_are_required() {
        assert!(matches!(
            ScenarioConfig::from_yaml_str("settings: { g: 1.0 }\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn rejects_degenerate_bounds() {
        assert!(matches!(
            ScenarioConfig::from_yaml_str("bounds: { width: 0, height: 600 }\n"),
            Err(ConfigError::InvalidBounds { .. })
        ));
        assert!(Bounds::new(10.0, -1.0).is_err());
    }

    #[test]
    fn rejects_negative_population_mass() {
        let src = "\
bounds: { width: 800, height: 600 }
population:
  count: 10
  distribution:
    mass_min: -20
";
        assert!(matches!(
            ScenarioConfig::from_yaml_str(src),
            Err(ConfigError::Population(SpawnError::InvalidDistribution {
                name: "mass_min",
                ..
            }))
        ));
    }

    #[test]
    fn distribution_limits() {
        assert!(SpawnDistribution::default().validate().is_ok());
        let zero_span = SpawnDistribution {
            mass_span: 0.0,
            ..SpawnDistribution::default()
        };
        assert!(zero_span.validate().is_ok());
        for bad in [
            SpawnDistribution {
                mass_min: 0.0,
                ..SpawnDistribution::default()
            },
            SpawnDistribution {
                mass_span: -1.0,
                ..SpawnDistribution::default()
            },
            SpawnDistribution {
                temperature: f32::NAN,
                ..SpawnDistribution::default()
            },
            SpawnDistribution {
                skew_exponent: -2,
                ..SpawnDistribution::default()
            },
        ] {
            assert!(bad.validate().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn skewed_mass_stays_in_range() {
        let d = SpawnDistribution::default();
        assert_eq!(d.mass_from_unit(0.0), 10.0);
        assert_eq!(d.mass_from_unit(0.5), 0.125 * 100.0 + 10.0);
        assert!(d.mass_from_unit(0.999) < 110.0);
    }
}
