//! Weighted input graph for the clustering engine.

use std::collections::BTreeMap;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::{InstanceId, Link};

/// The similarity graph over all instances.
///
/// Each node keeps only the links it was the *source* of during the
/// pairwise pass, so an undirected edge `a - b` is stored once, on the
/// instance enumerated first. Isolated instances are present with no links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<InstanceId, Vec<Link>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` (if absent) and append `links` to its adjacency.
    pub fn add_node_and_links(&mut self, id: InstanceId, links: impl IntoIterator<Item = Link>) {
        self.nodes.entry(id).or_default().extend(links);
    }

    /// Add nodes without links; existing nodes are left untouched.
    pub fn add_nodes(&mut self, ids: impl IntoIterator<Item = InstanceId>) {
        for id in ids {
            self.nodes.entry(id).or_default();
        }
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored links, self-loops included.
    pub fn link_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.nodes.keys().copied()
    }

    /// Links stored on `id` as their source.
    pub fn links(&self, id: InstanceId) -> &[Link] {
        self.nodes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All stored links as `(source, link)` pairs in ascending source order.
    pub fn edges(&self) -> impl Iterator<Item = (InstanceId, &Link)> + '_ {
        self.nodes
            .iter()
            .flat_map(|(src, links)| links.iter().map(move |ln| (*src, ln)))
    }

    /// Undirected weight lookup: checks the adjacency of both endpoints.
    pub fn weight(&self, a: InstanceId, b: InstanceId) -> Option<f32> {
        let find = |src: InstanceId, dst: InstanceId| {
            self.links(src).iter().find(|ln| ln.target == dst).map(|ln| ln.weight)
        };
        find(a, b).or_else(|| find(b, a))
    }

    /// Nodes without any stored link in either direction.
    pub fn isolated(&self) -> Vec<InstanceId> {
        let targets: HashSet<InstanceId> = self.edges().map(|(_, ln)| ln.target).collect();
        self.nodes
            .iter()
            .filter(|(id, links)| links.is_empty() && !targets.contains(*id))
            .map(|(id, _)| *id)
            .collect()
    }
}
