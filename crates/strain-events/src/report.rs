//! Report Types
//!
//! End-of-run reports: centrality of the contact graph, spreader counts,
//! and the run summary.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{NodeId, StrainIndex};

const INFINITE: &str = "infinite";

/// A ratio that stays defined when the denominator is zero.
///
/// Serializes as a bare number, or as the string `"infinite"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Value(f64),
    Infinite,
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Value(v) => serializer.serialize_f64(*v),
            Ratio::Infinite => serializer.serialize_str(INFINITE),
        }
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Value(f64),
            Sentinel(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Value(v) => Ok(Ratio::Value(v)),
            Repr::Sentinel(s) if s == INFINITE => Ok(Ratio::Infinite),
            Repr::Sentinel(s) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a number or \"infinite\"",
            )),
        }
    }
}

impl Ratio {
    /// `numerator / denominator`, or [`Ratio::Infinite`] when the denominator is zero.
    pub fn of(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Ratio::Infinite
        } else {
            Ratio::Value(numerator as f64 / denominator as f64)
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Ratio::Infinite)
    }

    /// The ratio as a float, with `f64::INFINITY` for the sentinel.
    pub fn as_f64(&self) -> f64 {
        match self {
            Ratio::Value(v) => *v,
            Ratio::Infinite => f64::INFINITY,
        }
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ratio::Value(v) => write!(f, "{:.2}", v),
            Ratio::Infinite => write!(f, "inf"),
        }
    }
}

/// Centrality scores for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeCentrality {
    pub node: NodeId,
    pub degree: f64,
    pub betweenness: f64,
}

/// Degree and betweenness centrality for every node of the final graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityReport {
    pub nodes: Vec<NodeCentrality>,
}

impl CentralityReport {
    pub fn get(&self, node: NodeId) -> Option<&NodeCentrality> {
        self.nodes.iter().find(|c| c.node == node)
    }

    /// The `k` nodes with the highest betweenness, ties broken by node id.
    pub fn top_by_betweenness(&self, k: usize) -> Vec<NodeCentrality> {
        let mut sorted = self.nodes.clone();
        sorted.sort_by(|a, b| {
            b.betweenness
                .total_cmp(&a.betweenness)
                .then(a.node.cmp(&b.node))
        });
        sorted.truncate(k);
        sorted
    }
}

/// How many other agents a node infected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreaderEntry {
    pub node: NodeId,
    pub infected: usize,
}

/// Spreaders for one strain, most prolific first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreaderReport {
    pub strain: StrainIndex,
    pub spreaders: Vec<SpreaderEntry>,
}

/// Final state of one strain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainSummary {
    pub strain: StrainIndex,
    pub name: String,
    pub infected: usize,
    pub exposed: usize,
    pub naive: usize,
    pub immune: usize,
    /// Infections over the whole run, seeds included
    pub total_infections: usize,
    pub skeptical_susceptible_ratio: Ratio,
}

/// Summary written at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub num_nodes: usize,
    pub edge_count: usize,
    pub active_strains: usize,
    pub strains: Vec<StrainSummary>,
}
