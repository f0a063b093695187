mod common;

use common::{content, foo_v2, layout};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tessera_plugin::{Descriptor, MissingPlugin};
use tessera_registry::{DEFAULT_CONTENT_PLUGIN, DefaultContent, Registry};
use tessera_types::SlotKind;

// ── Registration ─────────────────────────────────────────────────

#[test]
fn new_registry_holds_only_the_default_content_plugin() {
    let registry = Registry::new();
    assert_eq!(registry.list_names(), vec![DEFAULT_CONTENT_PLUGIN]);
    assert!(registry.descriptors(SlotKind::Layout).is_empty());
    assert!(!registry.has_native());
    let default = &registry.descriptors(SlotKind::Content)[0];
    assert!(default.render_as::<DefaultContent>().is_some());
    assert!(default.hide_in_menu());
}

#[test]
fn register_appends_in_order_with_duplicates() {
    let mut registry = Registry::new();
    registry.register(content("text", "1.0.0"));
    registry.register(layout("grid", "1.0.0"));
    registry.register(content("text", "2.0.0"));

    assert_eq!(
        registry.list_names(),
        vec![DEFAULT_CONTENT_PLUGIN, "text", "text", "grid"]
    );
}

#[test]
fn unregister_removes_every_version_in_one_category() {
    let mut registry = Registry::new();
    registry.register(content("shared", "1.0.0"));
    registry.register(content("shared", "2.0.0"));
    registry.register(layout("shared", "1.0.0"));

    assert_eq!(registry.unregister(SlotKind::Content, "shared"), 2);
    assert_eq!(registry.unregister(SlotKind::Content, "shared"), 0);
    assert_eq!(registry.list_names(), vec![DEFAULT_CONTENT_PLUGIN, "shared"]);
}

#[test]
fn replace_all_content_reinserts_default_first() {
    let mut registry = Registry::new();
    registry.register(content("old", "1.0.0"));
    registry.replace_all(SlotKind::Content, vec![content("a", "1.0.0"), content("b", "1.0.0")]);
    assert_eq!(registry.list_names(), vec![DEFAULT_CONTENT_PLUGIN, "a", "b"]);
}

#[test]
fn replace_all_layout_has_no_default() {
    let mut registry = Registry::new();
    registry.register(layout("old", "1.0.0"));
    registry.replace_all(SlotKind::Layout, vec![layout("new", "1.0.0")]);
    let names: Vec<&str> = registry
        .descriptors(SlotKind::Layout)
        .iter()
        .map(|d| d.name())
        .collect();
    assert_eq!(names, vec!["new"]);
}

#[test]
fn replace_all_skips_descriptors_of_another_category() {
    let mut registry = Registry::new();
    registry.register(layout("old", "1.0.0"));
    let native = Descriptor::native("drop/a", "1.0.0").render(()).build().unwrap();

    let registered = registry.replace_all(
        SlotKind::Layout,
        vec![content("text", "1.0.0"), native, layout("grid", "1.0.0")],
    );

    assert_eq!(registered, 1);
    assert_eq!(registry.list_names(), vec![DEFAULT_CONTENT_PLUGIN, "grid"]);
    assert!(!registry.has_native());
}

#[test]
fn native_descriptor_is_a_single_slot() {
    let mut registry = Registry::new();
    let first = Descriptor::native("drop/a", "1.0.0").render(()).build().unwrap();
    let second = Descriptor::native("drop/b", "1.0.0").render(()).build().unwrap();
    registry.register(first);
    registry.register(second);

    assert_eq!(registry.native().unwrap().name(), "drop/b");
    assert_eq!(registry.list_names(), vec![DEFAULT_CONTENT_PLUGIN]);
    assert_eq!(registry.clear_native().unwrap().name(), "drop/b");
    assert!(!registry.has_native());
}

#[test]
fn set_native_and_register_share_the_slot() {
    let mut registry = Registry::new();
    registry.register(Descriptor::native("drop/a", "1.0.0").render(()).build().unwrap());
    let set = registry.set_native(Descriptor::native("drop/b", "1.0.0").render(()).build().unwrap());
    assert!(Arc::ptr_eq(registry.native().unwrap(), &set));

    registry.register(Descriptor::native("drop/c", "1.0.0").render(()).build().unwrap());
    assert_eq!(registry.native().unwrap().name(), "drop/c");
}

// ── Resolution ───────────────────────────────────────────────────

#[test]
fn registered_descriptor_resolves_to_itself() {
    let mut registry = Registry::new();
    let text = registry.register(content("text", "1.2.3"));
    let grid = registry.register(layout("grid", "0.4.0"));

    let found = registry.resolve(SlotKind::Content, "text", "1.2.3");
    assert!(Arc::ptr_eq(&found.matched, &text));
    assert!(found.mismatched.is_none());

    let found = registry.resolve(SlotKind::Layout, "grid", "0.4.0");
    assert!(Arc::ptr_eq(&found.matched, &grid));
}

#[test]
fn first_satisfying_registration_wins() {
    let mut registry = Registry::new();
    let early = registry.register(content("text", "1.1.0"));
    registry.register(content("text", "1.9.0"));

    let found = registry.resolve(SlotKind::Content, "text", "^1.0.0");
    assert!(Arc::ptr_eq(&found.matched, &early));
}

#[test]
fn range_skips_non_satisfying_versions() {
    let mut registry = Registry::new();
    registry.register(content("text", "1.1.0"));
    let later = registry.register(content("text", "2.3.0"));

    let found = registry.resolve(SlotKind::Content, "text", "2.x");
    assert!(Arc::ptr_eq(&found.matched, &later));
}

#[test]
fn categories_are_resolved_separately() {
    let mut registry = Registry::new();
    registry.register(layout("text", "1.0.0"));
    let found = registry.resolve(SlotKind::Content, "text", "1.0.0");
    assert!(found.matched.is_placeholder());
    assert!(found.mismatched.is_none());
}

#[test]
fn wrong_version_is_reported_as_mismatched() {
    let mut registry = Registry::new();
    let v2 = registry.register(foo_v2());
    registry.register(content("foo", "1.5.0"));

    let found = registry.resolve(SlotKind::Content, "foo", "1.0.0");
    assert!(found.matched.is_placeholder());
    assert_eq!(found.matched.name(), "foo");
    assert!(Arc::ptr_eq(found.mismatched.as_ref().unwrap(), &v2));
}

#[test]
fn unknown_plugin_resolves_to_placeholder() {
    let registry = Registry::new();
    let found = registry.resolve(SlotKind::Content, "x/y", "9.9.9");

    assert!(found.matched.is_placeholder());
    assert_eq!(found.matched.name(), "x/y");
    assert_eq!(found.matched.version(), "9.9.9");
    assert!(found.mismatched.is_none());

    let missing = found.matched.render_as::<MissingPlugin>().unwrap();
    assert_eq!(missing.kind, SlotKind::Content);
    assert_eq!(missing.version, "9.9.9");
}

#[test]
fn unparsable_range_falls_back_to_mismatched() {
    let mut registry = Registry::new();
    let text = registry.register(content("text", "1.0.0"));
    let found = registry.resolve(SlotKind::Content, "text", "garbage");
    assert!(found.matched.is_placeholder());
    assert!(Arc::ptr_eq(found.mismatched.as_ref().unwrap(), &text));
}

#[test]
fn missing_render_override_is_used_by_placeholders() {
    struct Fallback;
    let mut registry = Registry::new();
    registry.set_missing_render(Arc::new(Fallback));
    let found = registry.resolve(SlotKind::Layout, "gone", "1.0.0");
    assert!(found.matched.render_as::<Fallback>().is_some());
    assert_eq!(found.matched.name(), "gone");
}

#[test]
fn menu_slices_follow_registration_order() {
    let mut registry = Registry::new();
    registry.register(layout("grid", "1.0.0"));
    registry.register(content("text", "1.0.0"));

    let visible: Vec<&str> = registry
        .content()
        .iter()
        .filter(|d| !d.hide_in_menu())
        .map(|d| d.name())
        .collect();
    assert_eq!(visible, vec!["text"]);
    assert_eq!(registry.layout()[0].name(), "grid");
}
