//! End-to-end tests for building self-documenting trees

use pretty_assertions::assert_eq;

use helptree::application::{with_help, SelfRef};
use helptree::domain::{
    annotate, collect_help_entries, erase, render, shallow_annotate, zip_help, Annotator, Artifact,
    DomainError, HelpEntry, HelpOptions, Thunk, Value,
};
use helptree::util::testing;

fn help_text(options: &HelpOptions, tree: &Value) -> String {
    render(options, collect_help_entries(options, tree))
}

#[test]
fn given_documented_leaf_when_building_then_help_fails_with_listing() {
    testing::init_test_setup();

    let tree = with_help(&HelpOptions::default(), |_, help| {
        Value::attrs([("x", help.help("desc", 42))])
    })
    .unwrap();

    assert_eq!(tree.select(&["x"]).unwrap(), Value::Int(42));
    assert_eq!(
        tree.select(&["all"]).unwrap(),
        Value::attrs([("x", Value::Int(42))])
    );
    assert_eq!(
        tree.select(&["help"]).unwrap_err(),
        DomainError::Thrown("Available targets:\n\nx - desc".to_string())
    );
}

#[test]
fn given_nested_attrsets_when_rendering_then_three_lines_in_order() {
    let raw = Value::attrs([(
        "parent",
        annotate(
            "P",
            Value::attrs([(
                "child",
                annotate("C", Value::attrs([("grandchild", annotate("G", 1))])),
            )]),
        ),
    )]);

    let text = help_text(&HelpOptions::default(), &raw);

    assert_eq!(
        text,
        "parent: (attrset) P\nparent.child: (attrset) C\nparent.child.grandchild - G"
    );
    assert_eq!(
        erase(&raw),
        Value::attrs([(
            "parent",
            Value::attrs([("child", Value::attrs([("grandchild", Value::Int(1))]))])
        )])
    );
}

#[test]
fn given_unannotated_tree_when_erasing_then_identity() {
    let tree = Value::attrs([
        ("a", Value::Int(1)),
        ("b", Value::attrs([("c", Value::from("text"))])),
        ("d", Value::List(vec![Value::Bool(true), Value::Null])),
    ]);

    assert_eq!(erase(&tree), tree);
}

#[test]
fn given_annotated_leaf_when_erasing_and_collecting_then_round_trip() {
    let raw = Value::attrs([("k", annotate("m", "v"))]);

    assert_eq!(erase(&raw), Value::attrs([("k", Value::from("v"))]));
    assert_eq!(
        collect_help_entries(&HelpOptions::default(), &raw),
        vec![HelpEntry::new(
            vec!["k".to_string()],
            Some("m".to_string()),
            Value::from("v")
        )]
    );
}

#[test]
fn given_shallow_annotation_when_collecting_then_descendants_hidden() {
    let raw = Value::attrs([(
        "docs",
        shallow_annotate(
            "Documentation",
            Value::attrs([("api", annotate("API docs", "rustdoc"))]),
        ),
    )]);

    let entries = collect_help_entries(&HelpOptions::default(), &raw);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].dotted(), "docs");
    assert_eq!(entries[0].message.as_deref(), Some("Documentation"));
}

#[test]
fn given_mixed_entries_when_rendering_then_documented_first_then_alphabetical() {
    let options = HelpOptions::default().with_annotated_attrs_only(false);
    let raw = Value::attrs([
        ("zeta", annotate("Z", 1)),
        ("plain", Value::Int(2)),
        ("alpha", annotate("A", 3)),
    ]);

    assert_eq!(help_text(&options, &raw), "alpha - A\nzeta - Z\nplain");
}

#[test]
fn given_zip_help_when_rendering_then_only_matching_keys_documented() {
    let original = match Value::attrs([("a", Value::Int(1)), ("b", Value::Int(2))]) {
        Value::Attrs(attrs) => attrs,
        other => panic!("unexpected value: {other}"),
    };
    let texts = match Value::attrs([("a", Value::from("A")), ("c", Value::from("C"))]) {
        Value::Attrs(attrs) => attrs,
        other => panic!("unexpected value: {other}"),
    };

    let zipped = Value::Attrs(zip_help(&Annotator::deep(), &original, &texts));
    let options = HelpOptions::default().with_annotated_attrs_only(false);

    assert_eq!(help_text(&options, &zipped), "a - A\nb");
}

#[test]
fn given_self_reference_when_building_then_alias_resolves_to_erased_value() {
    let tree = with_help(&HelpOptions::default().returning_text(), |self_ref, help| {
        Value::attrs([
            ("build", help.help("Build it", Value::attrs([("out", Value::from("/out"))]))),
            ("default", help.help("Alias for build", self_ref.get("build"))),
        ])
    })
    .unwrap();

    assert_eq!(
        tree.select(&["default", "out"]).unwrap(),
        Value::from("/out")
    );
    assert_eq!(
        tree.select(&["help"]).unwrap(),
        Value::from(
            "Available targets:\n\nbuild: (attrset) Build it\ndefault: (attrset) Alias for build"
        )
    );
}

#[test]
fn given_self_reference_outside_build_when_forced_then_not_ready() {
    let self_ref = SelfRef::new();
    let alias = self_ref.get("anything");

    assert!(matches!(
        alias.force(),
        Err(DomainError::SelfNotReady { .. })
    ));
}

#[test]
fn given_failing_value_when_building_then_help_still_renders() {
    let tree = with_help(&HelpOptions::default().returning_text(), |_, help| {
        Value::attrs([
            ("broken", help.help("Unsupported here", Thunk::failing("no"))),
            ("ok", help.help("Works", 1)),
        ])
    })
    .unwrap();

    assert_eq!(
        tree.select(&["help"]).unwrap(),
        Value::from("Available targets:\n\nbroken - Unsupported here\nok - Works")
    );
    assert_eq!(
        tree.select(&["broken"]).unwrap_err(),
        DomainError::Thrown("no".to_string())
    );
}

#[test]
fn given_artifact_when_listing_all_then_its_attributes_are_skipped() {
    let options = HelpOptions::default().with_annotated_attrs_only(false);
    let raw = Value::attrs([(
        "pkg",
        annotate(
            "Hello",
            Artifact::new("hello-2.12").with_attr("out", "/store/hello"),
        ),
    )]);

    assert_eq!(help_text(&options, &raw), "pkg - Hello");
}

#[test]
fn given_base_path_and_extra_entries_when_rendering_then_prefixed_and_appended() {
    let options = HelpOptions::default()
        .with_base_path(["packages", "x86_64-linux"])
        .with_additional_entries(vec![HelpEntry::new(
            vec!["devShell".to_string()],
            Some("Development shell".to_string()),
            Value::Null,
        )]);
    let raw = Value::attrs([("hello", annotate("Greeter", 1))]);

    assert_eq!(
        help_text(&options, &raw),
        "devShell - Development shell\npackages.x86_64-linux.hello - Greeter"
    );
}

#[test]
fn given_shallow_annotator_when_building_then_entries_stop_at_first_level() {
    let options = HelpOptions::default()
        .returning_text()
        .with_annotator(Annotator::shallow())
        .with_header("");

    let tree = with_help(&options, |_, help| {
        Value::attrs([(
            "outer",
            help.help("Outer", Value::attrs([("inner", help.help("Inner", 1))])),
        )])
    })
    .unwrap();

    assert_eq!(
        tree.select(&["help"]).unwrap(),
        Value::from("outer: (attrset) Outer")
    );
}

#[test]
fn given_doubly_annotated_leaf_when_building_then_value_plain_and_outer_listed() {
    let tree = with_help(&HelpOptions::default().returning_text(), |_, help| {
        Value::attrs([("x", help.help("outer", help.help("inner", 1)))])
    })
    .unwrap();

    assert_eq!(tree.select(&["x"]).unwrap(), Value::Int(1));
    assert_eq!(
        tree.select(&["all"]).unwrap(),
        Value::attrs([("x", Value::Int(1))])
    );
    assert_eq!(
        tree.select(&["help"]).unwrap(),
        Value::from("Available targets:\n\nx - outer")
    );
}
