use std::collections::{BTreeMap, BTreeSet};

use crate::edge_ast::Edge;

/// Distinct vertex names across sources and present targets, sorted ascending.
pub fn derive_vertices(edges: &[Edge]) -> BTreeSet<String> {
    let mut vertices = BTreeSet::new();
    for edge in edges {
        vertices.insert(edge.source.clone());
        if let Some(target) = &edge.target {
            vertices.insert(target.clone());
        }
    }
    vertices
}

/// Per-vertex enabled flags.
///
/// Built fresh from an edge list with every vertex enabled. Rebuilding for new
/// edges discards earlier toggles, even for vertices that survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    flags: BTreeMap<String, bool>,
}

impl Visibility {
    pub fn from_edges(edges: &[Edge]) -> Self {
        Self::from_vertices(derive_vertices(edges))
    }

    pub fn from_vertices(vertices: BTreeSet<String>) -> Self {
        Self {
            flags: vertices.into_iter().map(|v| (v, true)).collect(),
        }
    }

    /// Returns `false` when `vertex` is not part of the current graph.
    pub fn set(&mut self, vertex: &str, enabled: bool) -> bool {
        match self.flags.get_mut(vertex) {
            Some(flag) => {
                *flag = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, vertex: &str) -> bool {
        self.flags.get(vertex).copied().unwrap_or(false)
    }

    pub fn contains(&self, vertex: &str) -> bool {
        self.flags.contains_key(vertex)
    }

    pub fn enabled(&self) -> BTreeSet<String> {
        self.flags
            .iter()
            .filter(|(_, on)| **on)
            .map(|(v, _)| v.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(v, on)| (v.as_str(), *on))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
