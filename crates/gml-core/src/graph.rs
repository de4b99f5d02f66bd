//! Graph storage contract and the in-memory store used by default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::AttrValue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct GraphId(pub usize);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct EdgeId(pub usize);

/// Target of an attribute assignment inside one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity<V, E> {
    Graph,
    Vertex(V),
    Edge(E),
}

/// Construction primitives the parser drives while it scans.
///
/// Handles are opaque to the parser: it only stores them and hands them
/// back. Implementations decide how repeated keys on one entity resolve.
pub trait GraphSink {
    type GraphId: Copy;
    type VertexId: Copy;
    type EdgeId: Copy;

    fn new_graph(&mut self) -> Self::GraphId;

    fn add_vertex(&mut self, graph: Self::GraphId) -> Self::VertexId;

    fn add_edge(
        &mut self,
        graph: Self::GraphId,
        source: Self::VertexId,
        target: Self::VertexId,
    ) -> Self::EdgeId;

    fn set_attribute(
        &mut self,
        graph: Self::GraphId,
        entity: Entity<Self::VertexId, Self::EdgeId>,
        key: &str,
        value: AttrValue,
    );
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GmlVertex {
    pub attributes: BTreeMap<String, AttrValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GmlEdge {
    pub source: VertexId,
    pub target: VertexId,
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Undirected graph with an attribute bundle on the graph, every vertex
/// and every edge. Vertex and edge handles are insertion indices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GmlGraph {
    pub attributes: BTreeMap<String, AttrValue>,
    pub vertices: Vec<GmlVertex>,
    pub edges: Vec<GmlEdge>,
}

impl GmlGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn add_vertex(&mut self) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(GmlVertex::default());
        id
    }

    pub fn add_edge(&mut self, source: VertexId, target: VertexId) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(GmlEdge {
            source,
            target,
            attributes: BTreeMap::new(),
        });
        id
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&GmlVertex> {
        self.vertices.get(id.0)
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&GmlEdge> {
        self.edges.get(id.0)
    }

    /// First edge joining `a` and `b` in either direction.
    #[must_use]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edges
            .iter()
            .position(|edge| {
                (edge.source == a && edge.target == b) || (edge.source == b && edge.target == a)
            })
            .map(EdgeId)
    }

    /// Sets `key` on `entity`, replacing any earlier value. Handles that do
    /// not belong to this graph are ignored.
    pub fn set_attribute(
        &mut self,
        entity: Entity<VertexId, EdgeId>,
        key: &str,
        value: AttrValue,
    ) {
        let bundle = match entity {
            Entity::Graph => Some(&mut self.attributes),
            Entity::Vertex(id) => self
                .vertices
                .get_mut(id.0)
                .map(|vertex| &mut vertex.attributes),
            Entity::Edge(id) => self.edges.get_mut(id.0).map(|edge| &mut edge.attributes),
        };
        if let Some(bundle) = bundle {
            bundle.insert(key.to_string(), value);
        }
    }
}

/// A plain vector of graphs is the default output collection.
impl GraphSink for Vec<GmlGraph> {
    type GraphId = GraphId;
    type VertexId = VertexId;
    type EdgeId = EdgeId;

    fn new_graph(&mut self) -> GraphId {
        self.push(GmlGraph::new());
        GraphId(self.len() - 1)
    }

    fn add_vertex(&mut self, graph: GraphId) -> VertexId {
        match self.get_mut(graph.0) {
            Some(graph) => graph.add_vertex(),
            None => VertexId(usize::MAX),
        }
    }

    fn add_edge(&mut self, graph: GraphId, source: VertexId, target: VertexId) -> EdgeId {
        match self.get_mut(graph.0) {
            Some(graph) => graph.add_edge(source, target),
            None => EdgeId(usize::MAX),
        }
    }

    fn set_attribute(
        &mut self,
        graph: GraphId,
        entity: Entity<VertexId, EdgeId>,
        key: &str,
        value: AttrValue,
    ) {
        if let Some(graph) = self.get_mut(graph.0) {
            graph.set_attribute(entity, key, value);
        }
    }
}
