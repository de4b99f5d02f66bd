//! Single-pass recognizer for the flat GML subset.
//!
//! ```text
//! graphs := ws* (graph ws*)* EOF
//! graph  := "graph" ws* '[' ws* (attr ws*)* (node ws*)* (edge ws*)* ']'
//! node   := "node" ws* '[' ws* (attr ws*)* ']'
//! edge   := "edge" ws* '[' ws* (attr ws*)* ']'
//! attr   := identifier blank+ (quoted | decimal | integer)
//! ```
//!
//! No tree is built. Each production fires its action on the dispatcher as
//! soon as it matches, and the first failure aborts the scan.

use gml_core::{GmlError, GraphSink, Position, Span};

use crate::actions::{Dispatcher, Rule, Token};

#[derive(Debug, Clone, Copy)]
struct Scanner<'a> {
    input: &'a str,
    pos: Position,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos.byte..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos.byte += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        Some(ch)
    }

    fn bump_while(&mut self, mut keep: impl FnMut(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !keep(ch) {
                break;
            }
            self.bump();
        }
    }

    fn skip_ws(&mut self) {
        self.bump_while(is_ws);
    }

    fn at_end(&self) -> bool {
        self.pos.byte >= self.input.len()
    }

    fn slice_from(&self, start: Position) -> &'a str {
        &self.input[start.byte..self.pos.byte]
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.pos)
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                self.bump();
            }
            _ => return None,
        }
        self.bump_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        Some(self.slice_from(start))
    }

    /// Span covering the character under the cursor, or an empty span at
    /// end of input.
    fn here(&self) -> Span {
        let mut next = *self;
        next.bump();
        Span::new(self.pos, next.pos)
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(ch) => format!("'{}'", ch.escape_default()),
            None => "end of input".to_string(),
        }
    }
}

fn is_ws(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t')
}

/// Kind of block whose attributes are being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Graph,
    Node,
    Edge,
}

impl Block {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }

    const fn open_rule(self) -> Rule {
        match self {
            Self::Graph => Rule::GraphKeyword,
            Self::Node => Rule::NodeKeyword,
            Self::Edge => Rule::EdgeKeyword,
        }
    }

    const fn attribute_rule(self) -> Rule {
        match self {
            Self::Graph => Rule::GraphAttribute,
            Self::Node => Rule::NodeAttribute,
            Self::Edge => Rule::EdgeAttribute,
        }
    }

    const fn close_rule(self) -> Option<Rule> {
        match self {
            Self::Graph => Some(Rule::GraphClose),
            Self::Node => None,
            Self::Edge => Some(Rule::EdgeClose),
        }
    }
}

/// Position inside a graph body; sections only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Attributes,
    Nodes,
    Edges,
}

pub(crate) struct Recognizer<'a, 'd, 's, S: GraphSink> {
    scanner: Scanner<'a>,
    dispatcher: &'d mut Dispatcher<'s, S>,
}

impl<'a, 'd, 's, S: GraphSink> Recognizer<'a, 'd, 's, S> {
    pub(crate) fn new(input: &'a str, dispatcher: &'d mut Dispatcher<'s, S>) -> Self {
        Self {
            scanner: Scanner::new(input),
            dispatcher,
        }
    }

    /// `graphs := ws* (graph ws*)* EOF`
    pub(crate) fn graphs(&mut self) -> Result<(), GmlError> {
        self.scanner.skip_ws();
        while !self.scanner.at_end() {
            let start = self.scanner.pos;
            match self.scanner.identifier() {
                Some("graph") => {}
                _ => {
                    let span = if self.scanner.pos == start {
                        self.scanner.here()
                    } else {
                        self.scanner.span_from(start)
                    };
                    return Err(GmlError::grammar(
                        format!("expected 'graph', found {}", describe_at(start, &self.scanner)),
                        span,
                        &["graph"],
                    ));
                }
            }
            self.block(Block::Graph, start)?;
            self.scanner.skip_ws();
        }
        Ok(())
    }

    /// Recognizes `[ ... ]` after a block keyword that ended at the cursor.
    fn block(&mut self, block: Block, keyword_start: Position) -> Result<(), GmlError> {
        let keyword = Token {
            text: block.keyword(),
            span: self.scanner.span_from(keyword_start),
        };
        self.dispatcher.fire(block.open_rule(), keyword)?;

        self.scanner.skip_ws();
        self.expect_char('[', block)?;

        let mut section = Section::Attributes;
        loop {
            self.scanner.skip_ws();
            let start = self.scanner.pos;
            match self.scanner.peek() {
                Some(']') => {
                    self.scanner.bump();
                    if let Some(rule) = block.close_rule() {
                        let close = Token {
                            text: "]",
                            span: self.scanner.span_from(start),
                        };
                        self.dispatcher.fire(rule, close)?;
                    }
                    return Ok(());
                }
                None => {
                    return Err(GmlError::grammar(
                        format!("unterminated {} block", block.keyword()),
                        self.scanner.here(),
                        &["]"],
                    ));
                }
                Some(_) => {}
            }

            let Some(name) = self.scanner.identifier() else {
                return Err(GmlError::grammar(
                    format!(
                        "expected attribute or ']' in {} block, found {}",
                        block.keyword(),
                        self.scanner.found()
                    ),
                    self.scanner.here(),
                    &["identifier", "]"],
                ));
            };

            if block == Block::Graph
                && let Some(child) = self.child_block(name)
            {
                let wanted = match child {
                    Block::Node => Section::Nodes,
                    _ => Section::Edges,
                };
                if wanted < section {
                    return Err(GmlError::grammar(
                        "node blocks must precede edge blocks",
                        self.scanner.span_from(start),
                        &["edge", "]"],
                    ));
                }
                section = wanted;
                self.block(child, start)?;
                continue;
            }

            if section != Section::Attributes {
                return Err(GmlError::grammar(
                    "graph attributes must precede node and edge blocks",
                    self.scanner.span_from(start),
                    &["node", "edge", "]"],
                ));
            }
            self.attribute(block, start)?;
        }
    }

    /// `node`/`edge` opens a child block only when `[` follows; otherwise the
    /// identifier is an ordinary attribute key.
    fn child_block(&self, name: &str) -> Option<Block> {
        let child = match name {
            "node" => Block::Node,
            "edge" => Block::Edge,
            _ => return None,
        };
        let mut lookahead = self.scanner;
        lookahead.skip_ws();
        (lookahead.peek() == Some('[')).then_some(child)
    }

    /// `attr := identifier blank+ value`, with the identifier already read.
    fn attribute(&mut self, block: Block, start: Position) -> Result<(), GmlError> {
        if !self.scanner.peek().is_some_and(is_blank) {
            return Err(GmlError::grammar(
                format!(
                    "expected a space between attribute key and value, found {}",
                    self.scanner.found()
                ),
                self.scanner.here(),
                &["' '"],
            ));
        }
        self.scanner.bump_while(is_blank);

        let value_start = self.scanner.pos;
        if self.scanner.peek() == Some('"') {
            self.scanner.bump();
            self.scanner.bump_while(|ch| ch != '"');
            if self.scanner.bump().is_none() {
                return Err(GmlError::grammar(
                    "unterminated string literal",
                    self.scanner.span_from(value_start),
                    &["\""],
                ));
            }
        } else {
            self.scanner
                .bump_while(|ch| !is_ws(ch) && ch != '[' && ch != ']' && ch != '"');
        }
        if self.scanner.pos == value_start {
            return Err(GmlError::grammar(
                format!("expected attribute value, found {}", self.scanner.found()),
                self.scanner.here(),
                &["quoted string", "decimal", "integer"],
            ));
        }

        let token = Token {
            text: self.scanner.slice_from(start),
            span: self.scanner.span_from(start),
        };
        self.dispatcher.fire(block.attribute_rule(), token)
    }

    fn expect_char(&mut self, expected: char, block: Block) -> Result<(), GmlError> {
        if self.scanner.peek() == Some(expected) {
            self.scanner.bump();
            return Ok(());
        }
        Err(GmlError::grammar(
            format!(
                "expected '{expected}' after '{}', found {}",
                block.keyword(),
                self.scanner.found()
            ),
            self.scanner.here(),
            &["["],
        ))
    }
}

fn describe_at(start: Position, scanner: &Scanner<'_>) -> String {
    let word = scanner.slice_from(start);
    if word.is_empty() {
        scanner.found()
    } else {
        format!("'{word}'")
    }
}
