//! Identifier Types
//!
//! Node and strain identifiers. Both serialize as bare integers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on configured strains.
pub const MAX_STRAINS: usize = 3;

/// Identifier of a node in the contact graph, `0..N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        NodeId(value)
    }
}

/// Index of a strain, `0..MAX_STRAINS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrainIndex(pub usize);

impl StrainIndex {
    pub fn index(self) -> usize {
        self.0
    }

    /// Iterates strain indices `0..count`.
    pub fn range(count: usize) -> impl Iterator<Item = StrainIndex> {
        (0..count).map(StrainIndex)
    }
}

impl fmt::Display for StrainIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
