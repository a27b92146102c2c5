//! ECS Systems
//!
//! Random activation, the per-agent diffusion protocol, state queries and the tick hook.

pub mod activation;
pub mod census;
pub mod diffusion;
pub mod tick;

// Re-export commonly used systems
pub use activation::{activation_order, step_agents, RandomActivation};
pub use census::{
    agents_in_node_order, exposed_nodes, infected_nodes, not_infected_or_exposed, opposite_pairs,
    pair_counts, strain_counts, strain_snapshot, tick_counts,
};
pub use diffusion::{apply_transmission, step_agent, AgentQuery, TickContext, Transmission};
pub use tick::{build_tick_report, record_tick, TickReport, TickReports};
