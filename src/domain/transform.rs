//! Tree transformer: erasure and help-entry collection
//!
//! Both operations walk the raw (annotated) tree depth first. `erase` is a
//! [`rewrite`]; collection has its own walk because it only descends into
//! annotated children.

use std::borrow::Cow;

use tracing::{debug, instrument};

use crate::domain::annotation::{annotation_of, is_annotated};
use crate::domain::entities::HelpEntry;
use crate::domain::options::HelpOptions;
use crate::domain::value::Value;

/// Result of rewriting one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    /// Replacement for the node.
    pub value: Value,
    /// Rewrite the replacement's entries too (if it is a mapping).
    pub descend: bool,
}

/// Rewrite `tree` top-down with `f`.
///
/// `f` receives the path of each node and decides on its replacement and
/// whether to continue into the replacement. Mappings are rebuilt with the
/// same keys in the same order; lists and values whose forcing fails are
/// never entered.
pub fn rewrite<F>(tree: &Value, mut f: F) -> Value
where
    F: FnMut(&[String], &Value) -> Rewrite,
{
    let mut path = Vec::new();
    rewrite_at(&mut path, tree, &mut f)
}

fn rewrite_at<F>(path: &mut Vec<String>, node: &Value, f: &mut F) -> Value
where
    F: FnMut(&[String], &Value) -> Rewrite,
{
    let Rewrite { value, descend } = f(path.as_slice(), node);
    if !descend {
        return value;
    }
    let rebuilt = match value.force() {
        Ok(forced) => forced.map_entries(|key, child| {
            path.push(key.to_string());
            let rewritten = rewrite_at(path, child, f);
            path.pop();
            rewritten
        }),
        Err(_) => None,
    };
    rebuilt.unwrap_or(value)
}

/// Strip every annotation, recovering the original values.
///
/// Stacked annotations on one node are all stripped. A shallow annotation is
/// replaced by its original as-is: annotations below it survive.
#[instrument(level = "trace", skip_all)]
pub fn erase(tree: &Value) -> Value {
    rewrite(tree, |_, node| {
        let mut value = node.clone();
        let mut descend = true;
        while descend {
            let Some((original, shallow)) =
                annotation_of(&value).map(|a| (a.original.clone(), a.shallow))
            else {
                break;
            };
            value = original;
            descend = !shallow;
        }
        Rewrite { value, descend }
    })
}

/// Collect one entry per annotated node, depth first from `options.base_path`.
///
/// Within a mapping, annotated children come first (in insertion order),
/// followed by unannotated leaves when `annotated_attrs_only` is off and the
/// mapping is not skipped. `additional_entries` are appended last.
#[instrument(level = "debug", skip_all, fields(base = %options.base_path.join(".")))]
pub fn collect_help_entries(options: &HelpOptions, tree: &Value) -> Vec<HelpEntry> {
    let mut entries = Vec::new();
    collect_at(options, &options.base_path, tree, &mut entries);
    entries.extend(options.additional_entries.iter().cloned());
    debug!(count = entries.len(), "collected help entries");
    entries
}

fn collect_at(
    options: &HelpOptions,
    path: &[String],
    node: &Value,
    entries: &mut Vec<HelpEntry>,
) {
    let annotation = annotation_of(node);
    let next: Cow<'_, Value> = match &annotation {
        None => Cow::Borrowed(node),
        Some(annotated) if annotated.shallow => Cow::Owned(Value::empty_attrs()),
        Some(annotated) => Cow::Owned(annotated.original.clone()),
    };

    if let Some(annotated) = &annotation {
        entries.push(HelpEntry::new(
            path.to_vec(),
            annotated.message.clone(),
            annotated.original.clone(),
        ));
    }

    let Ok(forced) = next.force() else {
        return;
    };
    let Some(attrs) = forced.as_attrs() else {
        return;
    };

    let (documented, plain): (Vec<_>, Vec<_>) =
        attrs.iter().partition(|(_, child)| is_annotated(child));

    for (key, child) in documented {
        collect_at(options, &child_path(path, key), child, entries);
    }

    if options.annotated_attrs_only || (options.should_skip)(&*forced) {
        return;
    }
    entries.extend(
        plain
            .into_iter()
            .map(|(key, value)| HelpEntry::new(child_path(path, key), None, value.clone())),
    );
}

fn child_path(path: &[String], key: &str) -> Vec<String> {
    let mut child = path.to_vec();
    child.push(key.to_string());
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotation::{annotate, shallow_annotate};
    use crate::domain::value::{Artifact, Thunk};
    use pretty_assertions::assert_eq;

    fn paths(entries: &[HelpEntry]) -> Vec<String> {
        entries.iter().map(HelpEntry::dotted).collect()
    }

    #[test]
    fn given_plain_tree_when_erasing_then_unchanged() {
        let tree = Value::attrs([
            ("a", Value::Int(1)),
            ("b", Value::attrs([("c", Value::from("x"))])),
        ]);
        assert_eq!(erase(&tree), tree);
    }

    #[test]
    fn given_nested_annotations_when_erasing_then_all_removed() {
        let tree = Value::attrs([(
            "parent",
            annotate(
                "P",
                Value::attrs([(
                    "child",
                    annotate("C", Value::attrs([("grandchild", annotate("G", 1))])),
                )]),
            ),
        )]);

        let expected = Value::attrs([(
            "parent",
            Value::attrs([("child", Value::attrs([("grandchild", Value::Int(1))]))]),
        )]);
        assert_eq!(erase(&tree), expected);
    }

    #[test]
    fn given_double_annotation_when_erasing_then_both_wrappers_removed() {
        let tree = Value::attrs([
            ("x", annotate("outer", annotate("inner", 1))),
            (
                "y",
                annotate("outer", annotate("inner", Value::attrs([("z", annotate("Z", 2))]))),
            ),
        ]);

        let expected = Value::attrs([
            ("x", Value::Int(1)),
            ("y", Value::attrs([("z", Value::Int(2))])),
        ]);
        assert_eq!(erase(&tree), expected);
    }

    #[test]
    fn given_deep_over_shallow_annotation_when_erasing_then_stops_below_shallow() {
        let inner = Value::attrs([("child", annotate("m2", 5))]);
        let tree = Value::attrs([(
            "docs",
            annotate("outer", shallow_annotate("m", inner.clone())),
        )]);

        assert_eq!(erase(&tree), Value::attrs([("docs", inner)]));
    }

    #[test]
    fn given_unsorted_keys_when_erasing_then_insertion_order_kept() {
        let artifact = Artifact::new("pkg")
            .with_attr("out", annotate("Out", "/store/out"))
            .with_attr("doc", "/store/doc")
            .with_attr("bin", annotate("Bin", "/store/bin"));
        let tree = Value::attrs([
            ("zeta", annotate("Z", 1)),
            ("alpha", Value::Int(2)),
            ("mid", annotate("M", Value::from(artifact))),
        ]);

        let erased = erase(&tree);

        let keys: Vec<&str> = erased.as_attrs().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        let mid = erased.as_attrs().unwrap()["mid"].clone();
        assert!(matches!(mid, Value::Artifact(_)));
        let outputs: Vec<&str> = mid.as_attrs().unwrap().keys().map(String::as_str).collect();
        assert_eq!(outputs, vec!["out", "doc", "bin"]);
    }

    #[test]
    fn given_shallow_annotation_when_erasing_then_inner_annotations_survive() {
        let inner = Value::attrs([("child", annotate("m2", 5))]);
        let tree = Value::attrs([("docs", shallow_annotate("m", inner.clone()))]);

        assert_eq!(erase(&tree), Value::attrs([("docs", inner)]));
    }

    #[test]
    fn given_failing_placeholder_when_erasing_then_kept_untouched() {
        let broken = Value::Thunk(Thunk::failing("not on this platform"));
        let tree = Value::attrs([("broken", annotate("Unavailable", broken.clone()))]);

        assert_eq!(erase(&tree), Value::attrs([("broken", broken)]));
    }

    #[test]
    fn given_artifact_with_annotated_output_when_erasing_then_stays_artifact() {
        let artifact = Artifact::new("pkg").with_attr("doc", annotate("docs output", "/store/doc"));
        let tree = Value::attrs([("pkg", Value::from(artifact))]);

        let expected = Artifact::new("pkg").with_attr("doc", "/store/doc");
        assert_eq!(erase(&tree), Value::attrs([("pkg", Value::from(expected))]));
    }

    #[test]
    fn given_rewrite_when_visiting_then_receives_paths() {
        let tree = Value::attrs([("a", Value::attrs([("b", Value::Int(1))]))]);
        let mut seen = Vec::new();

        rewrite(&tree, |path, node| {
            seen.push(path.join("."));
            Rewrite {
                value: node.clone(),
                descend: true,
            }
        });

        assert_eq!(seen, vec!["", "a", "a.b"]);
    }

    #[test]
    fn given_annotated_leaf_when_collecting_then_single_entry() {
        let tree = Value::attrs([("x", annotate("desc", 42))]);

        let entries = collect_help_entries(&HelpOptions::default(), &tree);

        assert_eq!(
            entries,
            vec![HelpEntry::new(
                vec!["x".into()],
                Some("desc".into()),
                Value::Int(42)
            )]
        );
    }

    #[test]
    fn given_plain_tree_when_collecting_then_entries_only_without_annotated_only() {
        let tree = Value::attrs([
            ("a", Value::Int(1)),
            ("b", Value::attrs([("c", Value::Int(2))])),
        ]);

        let only = collect_help_entries(&HelpOptions::default(), &tree);
        let all = collect_help_entries(
            &HelpOptions::default().with_annotated_attrs_only(false),
            &tree,
        );

        assert!(only.is_empty());
        assert_eq!(paths(&all), vec!["a", "b"]);
        assert!(all.iter().all(|e| e.message.is_none()));
    }

    #[test]
    fn given_shallow_annotation_when_collecting_then_only_outer_entry() {
        let tree = Value::attrs([(
            "docs",
            shallow_annotate("m", Value::attrs([("child", annotate("m2", 5))])),
        )]);

        let entries = collect_help_entries(
            &HelpOptions::default().with_annotated_attrs_only(false),
            &tree,
        );

        assert_eq!(paths(&entries), vec!["docs"]);
    }

    #[test]
    fn given_mixed_children_when_collecting_then_annotated_before_leaves() {
        let tree = Value::attrs([(
            "test",
            annotate(
                "Tests",
                Value::attrs([
                    ("lint", Value::from("clippy")),
                    ("unit", annotate("Unit tests", "cargo test")),
                    ("fmt", Value::from("rustfmt")),
                    ("e2e", annotate("End to end", "playwright")),
                ]),
            ),
        )]);

        let entries = collect_help_entries(
            &HelpOptions::default().with_annotated_attrs_only(false),
            &tree,
        );

        assert_eq!(
            paths(&entries),
            vec!["test", "test.unit", "test.e2e", "test.lint", "test.fmt"]
        );
    }

    #[test]
    fn given_unannotated_intermediate_when_collecting_then_not_descended() {
        let tree = Value::attrs([(
            "group",
            Value::attrs([("hidden", annotate("never reached", 1))]),
        )]);

        let entries = collect_help_entries(&HelpOptions::default(), &tree);

        assert!(entries.is_empty());
    }

    #[test]
    fn given_annotated_artifact_when_collecting_then_outputs_not_listed() {
        let artifact = Artifact::new("hello-2.12")
            .with_attr("out", "/store/hello")
            .with_attr("man", annotate("Manual pages", "/store/hello-man"));
        let tree = Value::attrs([("hello", annotate("Hello", Value::from(artifact)))]);
        let options = HelpOptions::default().with_annotated_attrs_only(false);

        let entries = collect_help_entries(&options, &tree);

        assert_eq!(paths(&entries), vec!["hello", "hello.man"]);
    }

    #[test]
    fn given_base_path_and_additional_entries_when_collecting_then_applied() {
        let tree = Value::attrs([("x", annotate("X", 1))]);
        let extra = HelpEntry::new(vec!["extra".into()], Some("Extra".into()), Value::Null);
        let options = HelpOptions::default()
            .with_base_path(["packages", "x86_64-linux"])
            .with_additional_entries(vec![extra.clone()]);

        let entries = collect_help_entries(&options, &tree);

        assert_eq!(paths(&entries), vec!["packages.x86_64-linux.x", "extra"]);
        assert_eq!(entries[1], extra);
    }

    #[test]
    fn given_annotated_root_when_collecting_then_root_entry_has_base_path() {
        let tree = annotate("Everything", Value::attrs([("x", annotate("X", 1))]));

        let entries = collect_help_entries(&HelpOptions::default(), &tree);

        assert_eq!(entries[0].path, Vec::<String>::new());
        assert_eq!(paths(&entries), vec!["", "x"]);
    }

    #[test]
    fn given_custom_should_skip_when_collecting_then_leaves_suppressed() {
        let tree = Value::attrs([("a", Value::Int(1)), ("b", annotate("B", 2))]);
        let options = HelpOptions::default()
            .with_annotated_attrs_only(false)
            .with_should_skip(|_| true);

        let entries = collect_help_entries(&options, &tree);

        assert_eq!(paths(&entries), vec!["b"]);
    }
}
