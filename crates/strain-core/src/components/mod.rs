//! ECS Components
//!
//! Agent state, strain parameters, the contact graph and run-level resources.

pub mod agent;
pub mod network;
pub mod strain;
pub mod world;

pub use agent::*;
pub use network::*;
pub use strain::*;
pub use world::*;
