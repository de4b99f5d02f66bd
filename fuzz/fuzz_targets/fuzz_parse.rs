#![no_main]

use gml_core::GmlGraph;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(graphs) = gml_parser::parse(input) else {
        return;
    };

    for graph in &graphs {
        for edge in &graph.edges {
            assert!(edge.source.0 < graph.vertex_count());
            assert!(edge.target.0 < graph.vertex_count());
        }
    }

    let encoded = serde_json::to_string(&graphs).expect("serialize graphs");
    let _: Vec<GmlGraph> = serde_json::from_str(&encoded).expect("deserialize graphs");
});
