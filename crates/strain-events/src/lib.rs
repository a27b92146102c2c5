//! Shared record types and serialization for the strain simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces these records; export tooling and tests consume them.

pub mod ids;
pub mod provenance;
pub mod report;
pub mod snapshot;

// Re-export identifier types
pub use ids::{NodeId, StrainIndex, MAX_STRAINS};

// Re-export provenance types
pub use provenance::{InfectionEvent, InfectionRecord, INFECTIONS_CSV_HEADER};

// Re-export snapshot types
pub use snapshot::{
    AgentDump, PairCounts, StrainCounts, StrainSnapshot, StrainStateSnapshot, TickCounts,
};

// Re-export report types
pub use report::{
    CentralityReport, NodeCentrality, Ratio, RunSummary, SpreaderEntry, SpreaderReport,
    StrainSummary,
};
