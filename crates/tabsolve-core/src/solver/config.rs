use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_SOLVER_CONFIG_YAML: &str = include_str!("../../config/solver.default.yaml");

/// Static solver settings that survive `reset_solver`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub gamma: f64,
    pub debug_code: u32,
    pub debug_printing: bool,
    /// Upper bound on primitive steps a single option execution may take.
    pub max_option_steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            gamma: 0.99,
            debug_code: 0,
            debug_printing: false,
            max_option_steps: 1000,
        }
    }
}

impl SolverConfig {
    /// Parse a solver config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SolverConfigError> {
        let config: SolverConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a solver config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, SolverConfigError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_SOLVER_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, SolverConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    pub fn validate(&self) -> Result<(), SolverConfigError> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(SolverConfigError::Invalid(format!(
                "gamma must be within [0, 1], got {}",
                self.gamma
            )));
        }
        if self.max_option_steps == 0 {
            return Err(SolverConfigError::Invalid(
                "max_option_steps must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for loading and validating `SolverConfig`.
#[derive(Debug, Error)]
pub enum SolverConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid solver config: {0}")]
    Invalid(String),
}
