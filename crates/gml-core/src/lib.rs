#![forbid(unsafe_code)]

mod graph;

pub use graph::{EdgeId, Entity, GmlEdge, GmlGraph, GmlVertex, GraphId, GraphSink, VertexId};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
    pub byte: usize,
}

impl Position {
    /// Position of the first character of an input.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            line: 1,
            col: 1,
            byte: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.byte.saturating_sub(self.start.byte)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.start.fmt(f)
    }
}

/// Typed value of a `key value` attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    #[must_use]
    pub const fn kind(&self) -> AttrKind {
        match self {
            Self::Int(_) => AttrKind::Int,
            Self::Float(_) => AttrKind::Float,
            Self::Str(_) => AttrKind::Str,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "\"{value}\""),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Int,
    Float,
    Str,
}

impl AttrKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Float => "float",
            Self::Str => "string",
        }
    }
}

/// Which end of an edge a `source`/`target` attribute names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Source,
    Target,
}

impl Endpoint {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GmlErrorCode {
    #[default]
    Grammar,
    DuplicateVertexId,
    UnresolvedEndpoint,
    IncompleteEdge,
    InputTooLarge,
    Io,
}

impl GmlErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grammar => "gml/error/grammar",
            Self::DuplicateVertexId => "gml/error/duplicate-vertex-id",
            Self::UnresolvedEndpoint => "gml/error/unresolved-endpoint",
            Self::IncompleteEdge => "gml/error/incomplete-edge",
            Self::InputTooLarge => "gml/error/input-too-large",
            Self::Io => "gml/error/io",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum GmlError {
    #[error("{span}: {message}")]
    Grammar {
        message: String,
        span: Span,
        expected: Vec<String>,
    },
    #[error("{span}: node id {id} already exists")]
    DuplicateVertexId { id: i64, span: Span },
    #[error("{span}: edge {endpoint} {id} does not exist")]
    UnresolvedEndpoint {
        endpoint: Endpoint,
        id: i64,
        span: Span,
    },
    #[error("{span}: need to declare a source and target")]
    IncompleteEdge {
        has_source: bool,
        has_target: bool,
        span: Span,
    },
    #[error("input is {size} bytes, exceeding the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

impl GmlError {
    pub fn grammar(message: impl Into<String>, span: Span, expected: &[&str]) -> Self {
        Self::Grammar {
            message: message.into(),
            span,
            expected: expected.iter().map(|token| (*token).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn code(&self) -> GmlErrorCode {
        match self {
            Self::Grammar { .. } => GmlErrorCode::Grammar,
            Self::DuplicateVertexId { .. } => GmlErrorCode::DuplicateVertexId,
            Self::UnresolvedEndpoint { .. } => GmlErrorCode::UnresolvedEndpoint,
            Self::IncompleteEdge { .. } => GmlErrorCode::IncompleteEdge,
            Self::InputTooLarge { .. } => GmlErrorCode::InputTooLarge,
            Self::Io { .. } => GmlErrorCode::Io,
        }
    }

    /// Source location of the error. Errors raised before scanning starts
    /// report an empty span.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Grammar { span, .. }
            | Self::DuplicateVertexId { span, .. }
            | Self::UnresolvedEndpoint { span, .. }
            | Self::IncompleteEdge { span, .. } => *span,
            Self::InputTooLarge { .. } | Self::Io { .. } => Span::point(Position::start()),
        }
    }
}

/// Options accepted by every parse entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Inputs larger than this are rejected before scanning.
    pub max_input_bytes: usize,
}

pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024 * 1024;

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl ParseOptions {
    /// Reads options from a JSON object. Missing fields keep their defaults.
    pub fn from_json_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn check_input_size(&self, size: usize) -> Result<(), GmlError> {
        if size > self.max_input_bytes {
            return Err(GmlError::InputTooLarge {
                size,
                limit: self.max_input_bytes,
            });
        }
        Ok(())
    }
}
