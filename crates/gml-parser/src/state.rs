use gml_core::{AttrValue, Endpoint, GraphSink, Position};
use rustc_hash::FxHashMap;

/// Edge whose block is open: endpoints resolve as `source`/`target`
/// attributes arrive, everything else waits until the block closes.
pub(crate) struct PendingEdge<V> {
    pub(crate) source: Option<V>,
    pub(crate) target: Option<V>,
    pub(crate) attributes: Vec<(String, AttrValue)>,
    pub(crate) opened_at: Position,
}

impl<V: Copy> PendingEdge<V> {
    pub(crate) fn new(opened_at: Position) -> Self {
        Self {
            source: None,
            target: None,
            attributes: Vec::new(),
            opened_at,
        }
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: Endpoint, vertex: V) {
        match endpoint {
            Endpoint::Source => self.source = Some(vertex),
            Endpoint::Target => self.target = Some(vertex),
        }
    }

    pub(crate) fn endpoints(&self) -> Option<(V, V)> {
        self.source.zip(self.target)
    }
}

/// Mutable context of one parse call.
pub(crate) struct ParseState<S: GraphSink> {
    graphs: Vec<S::GraphId>,
    id_map: FxHashMap<i64, S::VertexId>,
    current_vertex: Option<S::VertexId>,
    pending_edge: Option<PendingEdge<S::VertexId>>,
}

impl<S: GraphSink> ParseState<S> {
    pub(crate) fn new() -> Self {
        Self {
            graphs: Vec::new(),
            id_map: FxHashMap::default(),
            current_vertex: None,
            pending_edge: None,
        }
    }

    /// Makes `graph` current and forgets every per-graph binding.
    pub(crate) fn begin_graph(&mut self, graph: S::GraphId) {
        self.graphs.push(graph);
        self.id_map.clear();
        self.current_vertex = None;
        self.pending_edge = None;
    }

    pub(crate) fn current_graph(&self) -> Option<S::GraphId> {
        self.graphs.last().copied()
    }

    pub(crate) fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub(crate) fn set_current_vertex(&mut self, vertex: S::VertexId) {
        self.current_vertex = Some(vertex);
    }

    pub(crate) fn current_vertex(&self) -> Option<S::VertexId> {
        self.current_vertex
    }

    /// Binds a declared id to a vertex. Returns `false` when the id is
    /// already bound in the current graph; the existing binding is kept.
    pub(crate) fn bind_id(&mut self, id: i64, vertex: S::VertexId) -> bool {
        if self.id_map.contains_key(&id) {
            return false;
        }
        self.id_map.insert(id, vertex);
        true
    }

    pub(crate) fn resolve_id(&self, id: i64) -> Option<S::VertexId> {
        self.id_map.get(&id).copied()
    }

    pub(crate) fn declared_vertex_count(&self) -> usize {
        self.id_map.len()
    }

    pub(crate) fn open_edge(&mut self, at: Position) {
        self.pending_edge = Some(PendingEdge::new(at));
    }

    pub(crate) fn pending_edge_mut(&mut self) -> Option<&mut PendingEdge<S::VertexId>> {
        self.pending_edge.as_mut()
    }

    pub(crate) fn take_pending_edge(&mut self) -> Option<PendingEdge<S::VertexId>> {
        self.pending_edge.take()
    }

    pub(crate) fn into_graphs(self) -> Vec<S::GraphId> {
        self.graphs
    }
}
