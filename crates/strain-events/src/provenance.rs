//! Infection Provenance
//!
//! Records of who infected whom, with which strain, at which step.

use serde::{Deserialize, Serialize};

use crate::{NodeId, StrainIndex};

/// Header row of the provenance CSV export.
pub const INFECTIONS_CSV_HEADER: &str = "target,source,strain,step";

/// One infection received by an agent.
///
/// `source` is `None` for seeded infections, which are always recorded at step 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfectionRecord {
    pub source: Option<NodeId>,
    pub strain: StrainIndex,
    pub step: u64,
}

impl InfectionRecord {
    /// Record for an initial outbreak node.
    pub fn seeded(strain: StrainIndex) -> Self {
        Self {
            source: None,
            strain,
            step: 0,
        }
    }

    /// Record for an infection transmitted over a contact edge.
    pub fn contact(source: NodeId, strain: StrainIndex, step: u64) -> Self {
        Self {
            source: Some(source),
            strain,
            step,
        }
    }

    pub fn is_seed(&self) -> bool {
        self.source.is_none()
    }
}

/// An infection record together with the agent that received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfectionEvent {
    pub target: NodeId,
    #[serde(flatten)]
    pub record: InfectionRecord,
}

impl InfectionEvent {
    pub fn new(target: NodeId, record: InfectionRecord) -> Self {
        Self { target, record }
    }

    /// Formats the event as a row matching [`INFECTIONS_CSV_HEADER`].
    pub fn to_csv_row(&self) -> String {
        let source = self
            .record
            .source
            .map(|s| s.to_string())
            .unwrap_or_default();
        format!(
            "{},{},{},{}",
            self.target, source, self.record.strain, self.record.step
        )
    }
}
