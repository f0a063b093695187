//! Shared test helpers for registry and codec tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use tessera_plugin::Descriptor;
use tessera_types::{Node, PluginRef, RawSlot, WireNode};

/// A content descriptor with identity transforms.
pub fn content(name: &str, version: &str) -> Descriptor {
    Descriptor::content(name, version).render(()).build().unwrap()
}

/// A layout descriptor with identity transforms.
pub fn layout(name: &str, version: &str) -> Descriptor {
    Descriptor::layout(name, version).render(()).build().unwrap()
}

/// `foo` at 2.0.0, upgrading any 1.x state by setting `upgraded`.
pub fn foo_v2() -> Descriptor {
    Descriptor::content("foo", "2.0.0")
        .render(())
        .migrate("1.x", "2.0.0", |mut state| {
            state["upgraded"] = json!(true);
            state
        })
        .build()
        .unwrap()
}

pub fn slot(name: &str, version: &str, state: Value) -> RawSlot {
    RawSlot::new(PluginRef::new(name, version), state)
}

/// A content cell wrapped in a row.
pub fn row_with(slot: RawSlot) -> WireNode {
    Node::row(vec![Node::cell().with_content(slot)])
}
