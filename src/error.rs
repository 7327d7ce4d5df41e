use thiserror::Error;

/// Rejected spawn request. Nothing is added to the universe.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("body mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("body density must be positive and finite, got {0}")]
    InvalidDensity(f32),
    #[error("spawn distribution `{name}` is out of range: {value}")]
    InvalidDistribution { name: &'static str, value: f32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("domain bounds must be positive, got {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },
    #[error("setting `{name}` is out of range: {value}")]
    InvalidSetting { name: &'static str, value: f32 },
    #[error("invalid initial population: {0}")]
    Population(#[from] SpawnError),
    #[error("failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
