//! Fuzz harness for wire parsing.
//!
//! Feeds arbitrary bytes through the JSON and YAML document parsers and
//! the identifier text decoders. For every document that parses, the wire
//! round trip and the content identity must hold without panicking.

#![no_main]

use bluegraph_core::node::wire;
use bluegraph_core::{blue_id_of, BlueId, Node};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Decoders must never panic, whatever the input.
    let _ = BlueId::from_base58(text);
    let _ = BlueId::from_cid(text);
    let _ = Node::from_yaml_str(text);

    let Ok(node) = Node::from_json_str(text) else {
        return;
    };

    // A document that parses must render, reparse to the same node, and
    // keep a stable identity.
    let rendered = node.to_json_value();
    let reparsed = wire::node_from_value(&rendered).expect("rendered wire form must reparse");
    assert_eq!(reparsed, node);

    if let Ok(id) = blue_id_of(&node) {
        let reparsed_id = blue_id_of(&reparsed).expect("equal nodes share canonical form");
        assert_eq!(reparsed_id, id);
    }
});
