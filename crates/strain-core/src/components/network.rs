//! Network Components
//!
//! The weighted contact graph and the node-to-agent index.

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use strain_events::NodeId;

/// How edge weights are assigned when an edge is created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum EdgeWeightPolicy {
    /// Every edge gets the same weight
    Fixed { value: f64 },
    /// Each directed edge draws its own weight from `[low, high]`
    Uniform { low: f64, high: f64 },
}

impl Default for EdgeWeightPolicy {
    fn default() -> Self {
        EdgeWeightPolicy::Fixed { value: 0.5 }
    }
}

impl EdgeWeightPolicy {
    pub fn validate(&self) -> Result<(), String> {
        let in_unit = |w: f64| (0.0..=1.0).contains(&w);
        match *self {
            EdgeWeightPolicy::Fixed { value } if !in_unit(value) => {
                Err(format!("fixed weight {} outside [0, 1]", value))
            }
            EdgeWeightPolicy::Uniform { low, high } if !in_unit(low) || !in_unit(high) => {
                Err(format!("uniform bounds [{}, {}] outside [0, 1]", low, high))
            }
            EdgeWeightPolicy::Uniform { low, high } if low > high => {
                Err(format!("uniform lower bound {} above upper bound {}", low, high))
            }
            _ => Ok(()),
        }
    }

    /// Weight for a new edge. The fixed policy does not consume randomness.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            EdgeWeightPolicy::Fixed { value } => value,
            EdgeWeightPolicy::Uniform { low, high } if low < high => rng.gen_range(low..=high),
            EdgeWeightPolicy::Uniform { low, .. } => low,
        }
    }

    /// Weight used when an agent is counted among its own neighbors
    pub fn self_weight(&self) -> f64 {
        match *self {
            EdgeWeightPolicy::Fixed { value } => value,
            EdgeWeightPolicy::Uniform { .. } => 1.0,
        }
    }
}

/// A directed, weighted edge as seen from its source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub weight: f64,
}

/// Directed contact network with per-edge weights.
///
/// Adjacency lists are kept sorted by target; self-loops and parallel edges are refused.
#[derive(Resource, Debug, Clone, Default)]
pub struct ContactGraph {
    adjacency: Vec<Vec<Edge>>,
    include_self: bool,
    self_weight: f64,
}

impl ContactGraph {
    /// Graph with `node_count` nodes and no edges
    pub fn with_nodes(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            include_self: false,
            self_weight: 1.0,
        }
    }

    /// Count each node among its own neighbors, with the given weight
    pub fn with_self_inclusion(mut self, include_self: bool, self_weight: f64) -> Self {
        self.include_self = include_self;
        self.self_weight = self_weight;
        self
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|edges| edges.len()).sum()
    }

    pub fn includes_self(&self) -> bool {
        self.include_self
    }

    fn position(&self, from: NodeId, to: NodeId) -> Option<Result<usize, usize>> {
        self.adjacency
            .get(from.index())
            .map(|edges| edges.binary_search_by(|e| e.target.cmp(&to)))
    }

    pub fn contains_edge(&self, from: NodeId, to: NodeId) -> bool {
        matches!(self.position(from, to), Some(Ok(_)))
    }

    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        match self.position(from, to) {
            Some(Ok(i)) => Some(self.adjacency[from.index()][i].weight),
            _ => None,
        }
    }

    /// Add a directed edge. Returns false for self-loops, unknown nodes and existing edges.
    pub fn insert_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> bool {
        if from == to || to.index() >= self.node_count() {
            return false;
        }
        match self.position(from, to) {
            Some(Err(i)) => {
                self.adjacency[from.index()].insert(i, Edge { target: to, weight });
                true
            }
            _ => false,
        }
    }

    /// Change the weight of an existing edge. Returns false if the edge does not exist.
    pub fn set_weight(&mut self, from: NodeId, to: NodeId, weight: f64) -> bool {
        match self.position(from, to) {
            Some(Ok(i)) => {
                self.adjacency[from.index()][i].weight = weight.clamp(0.0, 1.0);
                true
            }
            _ => false,
        }
    }

    /// Outgoing edges of a node, sorted by target
    pub fn out_edges(&self, node: NodeId) -> &[Edge] {
        self.adjacency
            .get(node.index())
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).len()
    }

    /// Neighbors an agent on `node` acts on, honoring the self-inclusion policy.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = Edge> + '_ {
        let own = (self.include_self && node.index() < self.node_count()).then_some(Edge {
            target: node,
            weight: self.self_weight,
        });
        own.into_iter().chain(self.out_edges(node).iter().copied())
    }

    /// All directed edges as `(from, to, weight)`, ordered by source then target
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(from, edges)| {
            edges.iter().map(move |e| (NodeId(from), e.target, e.weight))
        })
    }

    /// Every edge has its reverse
    pub fn is_symmetric(&self) -> bool {
        self.edges().all(|(from, to, _)| self.contains_edge(to, from))
    }
}

/// Maps graph nodes to the agent entities placed on them
#[derive(Resource, Debug, Clone, Default)]
pub struct NodeIndex {
    entities: Vec<Entity>,
}

impl NodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the agent for the next node id; returns that id
    pub fn place(&mut self, entity: Entity) -> NodeId {
        self.entities.push(entity);
        NodeId(self.entities.len() - 1)
    }

    /// The agent placed on `node`
    pub fn entity(&self, node: NodeId) -> Option<Entity> {
        self.entities.get(node.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Nodes and their agents in node-id order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Entity)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, entity)| (NodeId(i), *entity))
    }
}
