//! Semantic actions fired by the grammar as rules match.

use gml_core::{AttrValue, Endpoint, Entity, GmlError, GraphSink, Span};
use tracing::{debug, trace};

use crate::literal::{Attribute, classify_attribute};
use crate::state::ParseState;

/// Grammar productions that carry a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    GraphKeyword,
    GraphAttribute,
    GraphClose,
    NodeKeyword,
    NodeAttribute,
    EdgeKeyword,
    EdgeAttribute,
    EdgeClose,
}

impl Rule {
    const fn as_str(self) -> &'static str {
        match self {
            Self::GraphKeyword => "graph",
            Self::GraphAttribute => "graph attribute",
            Self::GraphClose => "graph close",
            Self::NodeKeyword => "node",
            Self::NodeAttribute => "node attribute",
            Self::EdgeKeyword => "edge",
            Self::EdgeAttribute => "edge attribute",
            Self::EdgeClose => "edge close",
        }
    }
}

/// Text matched by a rule together with where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub(crate) text: &'a str,
    pub(crate) span: Span,
}

pub(crate) struct Dispatcher<'s, S: GraphSink> {
    state: ParseState<S>,
    sink: &'s mut S,
}

impl<'s, S: GraphSink> Dispatcher<'s, S> {
    pub(crate) fn new(sink: &'s mut S) -> Self {
        Self {
            state: ParseState::new(),
            sink,
        }
    }

    pub(crate) fn fire(&mut self, rule: Rule, token: Token<'_>) -> Result<(), GmlError> {
        trace!(rule = rule.as_str(), at = %token.span, "rule matched");
        match rule {
            Rule::GraphKeyword => {
                let graph = self.sink.new_graph();
                self.state.begin_graph(graph);
                debug!(graph = self.state.graph_count().saturating_sub(1), "graph opened");
                Ok(())
            }
            Rule::GraphAttribute => {
                let graph = self.current_graph(token)?;
                let attribute = classify(token)?;
                self.sink
                    .set_attribute(graph, Entity::Graph, attribute.key, attribute.value);
                Ok(())
            }
            Rule::GraphClose => {
                debug!(
                    graph = self.state.graph_count().saturating_sub(1),
                    declared_ids = self.state.declared_vertex_count(),
                    "graph closed"
                );
                Ok(())
            }
            Rule::NodeKeyword => {
                let graph = self.current_graph(token)?;
                let vertex = self.sink.add_vertex(graph);
                self.state.set_current_vertex(vertex);
                Ok(())
            }
            Rule::NodeAttribute => self.node_attribute(token),
            Rule::EdgeKeyword => {
                self.state.open_edge(token.span.start);
                Ok(())
            }
            Rule::EdgeAttribute => self.edge_attribute(token),
            Rule::EdgeClose => self.close_edge(token),
        }
    }

    pub(crate) fn finish(self) -> Vec<S::GraphId> {
        self.state.into_graphs()
    }

    fn node_attribute(&mut self, token: Token<'_>) -> Result<(), GmlError> {
        let graph = self.current_graph(token)?;
        let Some(vertex) = self.state.current_vertex() else {
            return Err(outside_block("node attribute", token));
        };
        let attribute = classify(token)?;

        if let (Some(id), "id") = (attribute.value.as_int(), attribute.key) {
            if !self.state.bind_id(id, vertex) {
                return Err(GmlError::DuplicateVertexId {
                    id,
                    span: token.span,
                });
            }
            trace!(id, "vertex declared");
        }

        self.sink
            .set_attribute(graph, Entity::Vertex(vertex), attribute.key, attribute.value);
        Ok(())
    }

    fn edge_attribute(&mut self, token: Token<'_>) -> Result<(), GmlError> {
        let attribute = classify(token)?;

        let endpoint = match (attribute.key, &attribute.value) {
            ("source", AttrValue::Int(id)) => Some((Endpoint::Source, *id)),
            ("target", AttrValue::Int(id)) => Some((Endpoint::Target, *id)),
            _ => None,
        };
        let resolved = match endpoint {
            Some((endpoint, id)) => match self.state.resolve_id(id) {
                Some(vertex) => Some((endpoint, vertex)),
                None => {
                    return Err(GmlError::UnresolvedEndpoint {
                        endpoint,
                        id,
                        span: token.span,
                    });
                }
            },
            None => None,
        };

        let Some(edge) = self.state.pending_edge_mut() else {
            return Err(outside_block("edge attribute", token));
        };
        if let Some((endpoint, vertex)) = resolved {
            edge.set_endpoint(endpoint, vertex);
        }
        edge.attributes
            .push((attribute.key.to_string(), attribute.value));
        Ok(())
    }

    fn close_edge(&mut self, token: Token<'_>) -> Result<(), GmlError> {
        let graph = self.current_graph(token)?;
        let Some(edge) = self.state.take_pending_edge() else {
            return Err(outside_block("edge close", token));
        };
        let Some((source, target)) = edge.endpoints() else {
            return Err(GmlError::IncompleteEdge {
                has_source: edge.source.is_some(),
                has_target: edge.target.is_some(),
                span: Span::new(edge.opened_at, token.span.end),
            });
        };

        let created = self.sink.add_edge(graph, source, target);
        for (key, value) in edge.attributes {
            self.sink
                .set_attribute(graph, Entity::Edge(created), &key, value);
        }
        Ok(())
    }

    fn current_graph(&self, token: Token<'_>) -> Result<S::GraphId, GmlError> {
        self.state
            .current_graph()
            .ok_or_else(|| outside_block("graph content", token))
    }
}

fn classify(token: Token<'_>) -> Result<Attribute<'_>, GmlError> {
    classify_attribute(token.text).map_err(|err| {
        GmlError::grammar(
            err.describe(token.text),
            token.span,
            &["quoted string", "decimal", "integer"],
        )
    })
}

fn outside_block(what: &str, token: Token<'_>) -> GmlError {
    GmlError::grammar(
        format!("{what} outside of its enclosing block"),
        token.span,
        &[],
    )
}
