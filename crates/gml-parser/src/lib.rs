#![forbid(unsafe_code)]

//! Reader for flat GML documents: one or more `graph [ ... ]` blocks, each
//! holding `key value` attributes followed by `node [ ... ]` and
//! `edge [ ... ]` blocks.
//!
//! Parsing is a single left-to-right pass that drives a [`GraphSink`] as
//! rules match. Any error aborts the whole call.

mod actions;
mod grammar;
mod literal;
mod state;

use std::path::Path;

use gml_core::{GmlError, GmlGraph, GraphSink, ParseOptions};
use serde_json::json;
use tracing::debug;

use crate::actions::Dispatcher;
use crate::grammar::Recognizer;

/// Parses `input` into `sink`, returning the handles of the graphs created,
/// in source order.
///
/// On error the sink may already hold the graphs and vertices created before
/// the failure; no edge is ever created without both endpoints.
pub fn parse_into<S: GraphSink>(
    input: &str,
    sink: &mut S,
) -> Result<Vec<S::GraphId>, GmlError> {
    parse_into_with_options(input, sink, &ParseOptions::default())
}

pub fn parse_into_with_options<S: GraphSink>(
    input: &str,
    sink: &mut S,
    options: &ParseOptions,
) -> Result<Vec<S::GraphId>, GmlError> {
    options.check_input_size(input.len())?;

    let mut dispatcher = Dispatcher::new(sink);
    Recognizer::new(input, &mut dispatcher).graphs()?;
    let graphs = dispatcher.finish();
    debug!(graphs = graphs.len(), bytes = input.len(), "parsed GML input");
    Ok(graphs)
}

/// Parses `input` into freshly built [`GmlGraph`]s. Nothing is returned
/// unless the whole input parses.
pub fn parse(input: &str) -> Result<Vec<GmlGraph>, GmlError> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(
    input: &str,
    options: &ParseOptions,
) -> Result<Vec<GmlGraph>, GmlError> {
    let mut graphs = Vec::new();
    parse_into_with_options(input, &mut graphs, options)?;
    Ok(graphs)
}

/// Reads and parses the file at `path`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<GmlGraph>, GmlError> {
    parse_file_with_options(path, &ParseOptions::default())
}

pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Vec<GmlGraph>, GmlError> {
    let path = path.as_ref();
    let io_error = |err: std::io::Error| GmlError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    };

    let size = std::fs::metadata(path).map_err(io_error)?.len();
    options.check_input_size(usize::try_from(size).unwrap_or(usize::MAX))?;

    let source = std::fs::read_to_string(path).map_err(io_error)?;
    parse_with_options(&source, options)
}

/// Compact JSON summary of parsed graphs: counts per graph and in total.
#[must_use]
pub fn parse_evidence_json(graphs: &[GmlGraph]) -> String {
    let per_graph: Vec<_> = graphs
        .iter()
        .map(|graph| {
            json!({
                "attribute_count": graph.attributes.len(),
                "vertex_count": graph.vertex_count(),
                "edge_count": graph.edge_count(),
            })
        })
        .collect();

    json!({
        "graph_count": graphs.len(),
        "vertex_count": graphs.iter().map(GmlGraph::vertex_count).sum::<usize>(),
        "edge_count": graphs.iter().map(GmlGraph::edge_count).sum::<usize>(),
        "graphs": per_graph,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use gml_core::{
        AttrValue, Endpoint, GmlError, GmlErrorCode, GmlGraph, ParseOptions, VertexId,
    };
    use proptest::prelude::*;

    use super::{parse, parse_evidence_json, parse_into, parse_with_options};

    const SCENARIO_B: &str = r#"graph [ id 0 label "g1" v 42.42 node [ id 1 label "v1" v 2.2 ] node [ id 2 label "v2" v 3.2 ] edge [ source 1 target 2 id 3 label "e1" v 4.2 ] ]"#;

    fn error_code(input: &str) -> GmlErrorCode {
        match parse(input) {
            Ok(graphs) => panic!("expected failure, parsed {} graphs", graphs.len()),
            Err(err) => err.code(),
        }
    }

    #[test]
    fn empty_input_has_no_graphs() {
        assert_eq!(parse("").expect("empty"), Vec::<GmlGraph>::new());
        assert_eq!(parse(" \n\t\r\n").expect("whitespace"), Vec::<GmlGraph>::new());
    }

    #[test]
    fn three_empty_graphs() {
        let graphs = parse("graph [ ]\ngraph[]\n  graph\n[\n]\n").expect("empty graphs");
        assert_eq!(graphs.len(), 3);
        for graph in &graphs {
            assert_eq!(graph.vertex_count(), 0);
            assert_eq!(graph.edge_count(), 0);
            assert!(graph.attributes.is_empty());
        }
    }

    #[test]
    fn single_graph_with_bundles() {
        let graphs = parse(SCENARIO_B).expect("scenario B");
        assert_eq!(graphs.len(), 1);
        let graph = &graphs[0];

        assert_eq!(graph.attribute("id"), Some(&AttrValue::Int(0)));
        assert_eq!(graph.attribute("label"), Some(&AttrValue::from("g1")));
        assert_eq!(graph.attribute("v"), Some(&AttrValue::Float(42.42)));

        assert_eq!(graph.vertex_count(), 2);
        let v1 = &graph.vertices[0].attributes;
        assert_eq!(v1["id"], AttrValue::Int(1));
        assert_eq!(v1["label"], AttrValue::from("v1"));
        assert_eq!(v1["v"], AttrValue::Float(2.2));
        let v2 = &graph.vertices[1].attributes;
        assert_eq!(v2["id"], AttrValue::Int(2));
        assert_eq!(v2["label"], AttrValue::from("v2"));
        assert_eq!(v2["v"], AttrValue::Float(3.2));

        let edge_id = graph
            .find_edge(VertexId(0), VertexId(1))
            .expect("edge between v1 and v2");
        let edge = graph.edge(edge_id).expect("edge exists");
        assert_eq!((edge.source, edge.target), (VertexId(0), VertexId(1)));
        assert_eq!(edge.attributes["id"], AttrValue::Int(3));
        assert_eq!(edge.attributes["label"], AttrValue::from("e1"));
        assert_eq!(edge.attributes["v"], AttrValue::Float(4.2));
        assert_eq!(edge.attributes["source"], AttrValue::Int(1));
        assert_eq!(edge.attributes["target"], AttrValue::Int(2));
    }

    #[test]
    fn undeclared_source_fails() {
        let input = "graph [ node [ id 1 ] edge [ source 9 target 1 ] ]";
        match parse(input) {
            Err(GmlError::UnresolvedEndpoint { endpoint, id, span }) => {
                assert_eq!(endpoint, Endpoint::Source);
                assert_eq!(id, 9);
                assert_eq!((span.start.line, span.start.col), (1, 30));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn undeclared_target_is_distinguished() {
        let input = "graph [ node [ id 1 ] edge [ source 1 target 2 ] ]";
        assert!(matches!(
            parse(input),
            Err(GmlError::UnresolvedEndpoint {
                endpoint: Endpoint::Target,
                id: 2,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_id_fails_and_names_the_id() {
        let input = "graph [\n  node [ id 1 ]\n  node [ id 1 ]\n]";
        let err = parse(input).expect_err("duplicate id");
        assert!(matches!(err, GmlError::DuplicateVertexId { id: 1, .. }));
        assert_eq!(err.span().start.line, 3);
        assert!(err.to_string().contains("node id 1 already exists"));
    }

    #[test]
    fn edge_with_only_source_fails() {
        let input = "graph [ node [ id 1 ] edge [ source 1 ] ]";
        assert_eq!(error_code(input), GmlErrorCode::IncompleteEdge);
    }

    #[test]
    fn ids_are_scoped_per_graph() {
        let input = "graph [ node [ id 1 ] ] graph [ node [ id 1 ] ]";
        let graphs = parse(input).expect("same id in different graphs");
        assert_eq!(graphs.len(), 2);

        let input = "graph [ node [ id 1 ] ] graph [ node [ id 2 ] edge [ source 1 target 2 ] ]";
        assert_eq!(error_code(input), GmlErrorCode::UnresolvedEndpoint);
    }

    #[test]
    fn id_may_follow_other_node_attributes() {
        let input = r#"graph [ node [ label "a" v 1.5 id 10 ] node [ id 11 ] edge [ target 10 source 11 ] ]"#;
        let graphs = parse(input).expect("late id");
        let edge = &graphs[0].edges[0];
        assert_eq!((edge.source, edge.target), (VertexId(1), VertexId(0)));
    }

    #[test]
    fn reserved_keys_are_plain_attributes_elsewhere() {
        let input = r#"graph [ source 4 target 5 node [ source 1 target "x" ] ]"#;
        let graphs = parse(input).expect("reserved keys outside edges");
        assert_eq!(graphs[0].attribute("source"), Some(&AttrValue::Int(4)));
        assert_eq!(graphs[0].vertices[0].attributes["target"], AttrValue::from("x"));

        let input = r#"graph [ node [ id 1 ] edge [ source "1" target 1 ] ]"#;
        assert_eq!(error_code(input), GmlErrorCode::IncompleteEdge);
    }

    #[test]
    fn node_without_id_is_allowed_but_unreachable() {
        let graphs = parse(r#"graph [ node [ label "orphan" ] ]"#).expect("node without id");
        assert_eq!(graphs[0].vertex_count(), 1);
    }

    #[test]
    fn self_loops_and_parallel_edges_are_kept() {
        let input = "graph [ node [ id 1 ] edge [ source 1 target 1 ] edge [ source 1 target 1 ] ]";
        let graphs = parse(input).expect("self loops");
        assert_eq!(graphs[0].edge_count(), 2);
    }

    #[test]
    fn values_may_abut_the_closing_bracket() {
        let graphs = parse("graph[node[id 1]node[id 2]edge[source 1 target 2]]").expect("compact");
        assert_eq!(graphs[0].vertex_count(), 2);
        assert_eq!(graphs[0].edge_count(), 1);
    }

    #[test]
    fn crlf_line_endings_are_whitespace() {
        let input = "graph [\r\n  node [\r\n    id 1\r\n  ]\r\n]\r\n";
        assert_eq!(parse(input).expect("crlf")[0].vertex_count(), 1);
    }

    #[test]
    fn attribute_named_like_a_block_keyword() {
        let graphs = parse("graph [ node 3 edge 4 ]").expect("keyword-named attributes");
        assert_eq!(graphs[0].attribute("node"), Some(&AttrValue::Int(3)));
        assert_eq!(graphs[0].attribute("edge"), Some(&AttrValue::Int(4)));
        assert_eq!(graphs[0].vertex_count(), 0);
    }

    #[test]
    fn grammar_mismatches_abort() {
        for input in [
            "graph [",
            "graph [ node [ id 1 ]",
            "graph ]",
            "graph [ ] ]",
            "digraph [ ]",
            "graph [ id ]",
            "graph [ id\n1 ]",
            "graph [ label \"open ]",
            "graph [ v 1. ]",
            "graph [ id -1 ]",
            "graph [ node [ node [ ] ] ]",
            "graph [ node [ ] id 1 ]",
            "graph [ node [ id 1 ] edge [ source 1 target 1 ] node [ ] ]",
            "graph [ id 99999999999999999999 ]",
            "# comment\ngraph [ ]",
        ] {
            assert_eq!(error_code(input), GmlErrorCode::Grammar, "input: {input:?}");
        }
    }

    #[test]
    fn unterminated_block_reports_end_of_input() {
        let err = parse("graph [\n  node [ id 1 ]\n").expect_err("unterminated");
        let GmlError::Grammar { message, span, expected } = err else {
            panic!("expected grammar error");
        };
        assert_eq!(message, "unterminated graph block");
        assert_eq!(span.start.line, 3);
        assert_eq!(expected, vec!["]".to_string()]);
    }

    #[test]
    fn no_partial_results_on_failure() {
        let input = "graph [ node [ id 1 ] ] graph [ node [ id 1 ] node [ id 1 ] ]";
        assert!(parse(input).is_err());
    }

    #[test]
    fn parse_into_reports_handles_in_order() {
        let mut graphs: Vec<GmlGraph> = Vec::new();
        let handles = parse_into("graph [ ] graph [ ]", &mut graphs).expect("two graphs");
        assert_eq!(handles, vec![gml_core::GraphId(0), gml_core::GraphId(1)]);
        assert_eq!(graphs.len(), 2);
    }

    #[test]
    fn input_size_limit_is_enforced() {
        let options = ParseOptions { max_input_bytes: 8 };
        let err = parse_with_options("graph [ ]", &options).expect_err("too large");
        assert_eq!(err.code(), GmlErrorCode::InputTooLarge);
        assert!(parse_with_options("graph[]", &options).is_ok());
    }

    #[test]
    fn evidence_json_contains_counts() {
        let graphs = parse(SCENARIO_B).expect("scenario B");
        let evidence = parse_evidence_json(&graphs);
        assert!(evidence.contains("\"graph_count\":1"));
        assert!(evidence.contains("\"vertex_count\":2"));
        assert!(evidence.contains("\"edge_count\":1"));
    }

    fn ws() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec![" ", "\t", "\n", "\r\n"]), 0..3)
            .prop_map(|parts| parts.concat())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_graph_count_matches_blocks(seps in prop::collection::vec(ws(), 0..8)) {
            let mut input = String::new();
            for sep in &seps {
                input.push_str(sep);
                input.push_str("graph");
                input.push_str(sep);
                input.push('[');
                input.push_str(sep);
                input.push(']');
            }
            let graphs = parse(&input).expect("generated graphs parse");
            prop_assert_eq!(graphs.len(), seps.len());
        }

        #[test]
        fn prop_ids_map_to_vertices_and_edges_resolve(
            ids in prop::collection::btree_set(0i64..10_000, 1..12),
            picks in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..12),
        ) {
            let ids: Vec<i64> = ids.into_iter().collect();
            let mut input = String::from("graph [\n");
            for id in &ids {
                input.push_str(&format!("  node [ id {id} ]\n"));
            }
            for (a, b) in &picks {
                let (source, target) = (ids[a.index(ids.len())], ids[b.index(ids.len())]);
                input.push_str(&format!("  edge [ source {source} target {target} ]\n"));
            }
            input.push(']');

            let first = parse(&input).expect("generated graph parses");
            let second = parse(&input).expect("generated graph parses again");
            prop_assert_eq!(&first, &second);

            let graph = &first[0];
            prop_assert_eq!(graph.vertex_count(), ids.len());
            for (index, id) in ids.iter().enumerate() {
                prop_assert_eq!(&graph.vertices[index].attributes["id"], &AttrValue::Int(*id));
            }
            prop_assert_eq!(graph.edge_count(), picks.len());
            for (edge, (a, b)) in graph.edges.iter().zip(&picks) {
                prop_assert_eq!(edge.source, VertexId(a.index(ids.len())));
                prop_assert_eq!(edge.target, VertexId(b.index(ids.len())));
            }
        }

        #[test]
        fn prop_literal_kinds_never_conflate(number in 0u32..1_000_000, frac in 0u32..1000) {
            let input = format!(
                "graph [ a {number} b \"{number}\" c {number}.{frac} ]"
            );
            let graphs = parse(&input).expect("literal graph parses");
            let graph = &graphs[0];
            prop_assert_eq!(graph.attribute("a"), Some(&AttrValue::Int(i64::from(number))));
            prop_assert_eq!(graph.attribute("b"), Some(&AttrValue::Str(number.to_string())));
            let expected: f64 = format!("{number}.{frac}").parse().expect("decimal");
            prop_assert_eq!(graph.attribute("c"), Some(&AttrValue::Float(expected)));
        }

        #[test]
        fn prop_parse_never_panics(input in ".{0,256}") {
            let _ = parse(&input);
        }
    }
}
