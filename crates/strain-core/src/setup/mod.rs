//! World Setup
//!
//! Contact graph construction, agent spawning, outbreak seeding and skepticism banding.

pub mod agents;
pub mod network;
pub mod seeding;

pub use agents::*;
pub use network::*;
pub use seeding::*;
