//! Strain Simulation Engine Library
//!
//! Competing misinformation strains spreading over a weighted contact network.
//! Agents live in a `bevy_ecs` world; a single seeded generator drives setup and
//! every tick, so a seed and a configuration fully determine a run.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::{Config, ConfigError, StrainConfig};
pub use simulation::Simulation;
pub use systems::{TickReport, TickReports};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
