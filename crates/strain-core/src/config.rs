//! Configuration System
//!
//! Loads run parameters from tuning.toml so scenarios can be adjusted without recompiling.
//! Every value is checked by [`Config::validate`] before a world is built; nothing is
//! re-validated once the run starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use strain_events::{StrainIndex, MAX_STRAINS};

use crate::components::network::EdgeWeightPolicy;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub skepticism: SkepticismConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default = "default_strains")]
    pub strains: Vec<StrainConfig>,
}

/// Run length and reproducibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub ticks: u64,
    pub seed: u64,
    /// Write a full per-agent dump every tick
    pub agent_dumps: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 100,
            seed: 42,
            agent_dumps: true,
        }
    }
}

/// Contact graph parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Signed so that a negative count in the file is reported instead of failing to parse
    pub num_nodes: i64,
    pub avg_node_degree: f64,
    /// Whether an agent counts itself among its neighbors
    pub include_self: bool,
    pub weight: EdgeWeightPolicy,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_nodes: 50,
            avg_node_degree: 3.0,
            include_self: false,
            weight: EdgeWeightPolicy::default(),
        }
    }
}

/// Initial skepticism distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkepticismConfig {
    /// Assign quartile skepticism bands after seeding
    pub banded: bool,
}

impl Default for SkepticismConfig {
    fn default() -> Self {
        Self { banded: true }
    }
}

/// Which configured strains take part in the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub active_strains: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { active_strains: 2 }
    }
}

/// Parameters of a single strain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainConfig {
    pub name: String,
    pub initial_outbreak_size: i64,
    pub spread_chance: f64,
    /// Not read by the diffusion rules; exposure is gated by the spreader's skepticism
    pub exposed_chance: f64,
    pub check_frequency: f64,
    pub gain_skeptical_chance: f64,
    /// Skepticism every agent starts with before banding
    pub skeptical_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite: Option<StrainIndex>,
}

impl StrainConfig {
    /// A strain with the stock parameters and no pairing.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_outbreak_size: 1,
            spread_chance: 0.4,
            exposed_chance: 0.3,
            check_frequency: 0.4,
            gain_skeptical_chance: 0.5,
            skeptical_level: 0.2,
            opposite: None,
        }
    }

    pub fn with_opposite(mut self, opposite: usize) -> Self {
        self.opposite = Some(StrainIndex(opposite));
        self
    }
}

fn default_strains() -> Vec<StrainConfig> {
    vec![
        StrainConfig::named("virus_0").with_opposite(1),
        StrainConfig::named("virus_1").with_opposite(0),
        StrainConfig::named("virus_2"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            network: NetworkConfig::default(),
            skepticism: SkepticismConfig::default(),
            model: ModelConfig::default(),
            strains: default_strains(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_TUNING_PATH, e);
            Self::default()
        })
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check every parameter; a world is only built from a config that passes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.num_nodes < 1 {
            return Err(ConfigError::InvalidNodeCount(self.network.num_nodes));
        }
        let degree = self.network.avg_node_degree;
        if !degree.is_finite() || degree < 0.0 {
            return Err(ConfigError::InvalidDegree(degree));
        }
        self.network.weight.validate().map_err(ConfigError::InvalidWeight)?;

        if self.strains.is_empty() {
            return Err(ConfigError::NoStrains);
        }
        if self.strains.len() > MAX_STRAINS {
            return Err(ConfigError::TooManyStrains {
                got: self.strains.len(),
                max: MAX_STRAINS,
            });
        }
        let active = self.model.active_strains;
        if active == 0 || active > self.strains.len() {
            return Err(ConfigError::InvalidActiveStrains {
                active,
                configured: self.strains.len(),
            });
        }

        for (index, strain) in self.strains.iter().enumerate() {
            if strain.initial_outbreak_size < 0 {
                return Err(ConfigError::NegativeOutbreak {
                    strain: index,
                    size: strain.initial_outbreak_size,
                });
            }

            let probabilities = [
                ("spread_chance", strain.spread_chance),
                ("exposed_chance", strain.exposed_chance),
                ("check_frequency", strain.check_frequency),
                ("gain_skeptical_chance", strain.gain_skeptical_chance),
                ("skeptical_level", strain.skeptical_level),
            ];
            for (field, value) in probabilities {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::ProbabilityOutOfRange {
                        strain: index,
                        field,
                        value,
                    });
                }
            }

            if let Some(opposite) = strain.opposite {
                let reason = if opposite.index() >= self.strains.len() {
                    Some("no such strain")
                } else if opposite.index() == index {
                    Some("a strain cannot oppose itself")
                } else if self.strains[opposite.index()].opposite != Some(StrainIndex(index)) {
                    Some("pairing is not reciprocated")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(ConfigError::InvalidOpposite {
                        strain: index,
                        opposite: opposite.index(),
                        reason,
                    });
                }
            }
        }

        Ok(())
    }

    /// Node count; only meaningful after [`Config::validate`] succeeded.
    pub fn node_count(&self) -> usize {
        self.network.num_nodes.max(0) as usize
    }

    /// Outbreak size for a strain, clamped to the node count.
    pub fn outbreak_size(&self, strain: StrainIndex) -> usize {
        let requested = self.strains[strain.index()].initial_outbreak_size.max(0) as usize;
        requested.min(self.node_count())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("node count must be at least 1, got {0}")]
    InvalidNodeCount(i64),
    #[error("average node degree must be finite and non-negative, got {0}")]
    InvalidDegree(f64),
    #[error("invalid edge weight policy: {0}")]
    InvalidWeight(String),
    #[error("at least one strain must be configured")]
    NoStrains,
    #[error("at most {max} strains are supported, got {got}")]
    TooManyStrains { got: usize, max: usize },
    #[error("active strain count {active} must be between 1 and {configured}")]
    InvalidActiveStrains { active: usize, configured: usize },
    #[error("strain {strain}: initial outbreak size must be non-negative, got {size}")]
    NegativeOutbreak { strain: usize, size: i64 },
    #[error("strain {strain}: {field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange {
        strain: usize,
        field: &'static str,
        value: f64,
    },
    #[error("strain {strain}: opposite strain {opposite} rejected: {reason}")]
    InvalidOpposite {
        strain: usize,
        opposite: usize,
        reason: &'static str,
    },
}
