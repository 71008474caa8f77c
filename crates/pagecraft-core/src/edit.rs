//! Structural-edit primitives migration units compose. Each operates on
//! a borrowed node and returns new values; absent targets are no-ops,
//! clearly-invalid shapes raise `MigrationAssertionError`.

use crate::{
    document::{Node, ZoneKey},
    error::MigrationAssertionError,
    value::{EntityBinding, PropMap, PropValue},
    walk::{PathSegment, Splice, render_path},
};
use xxhash_rust::xxh3::xxh3_64;

/// Change a node's type tag, leaving everything else untouched.
#[must_use]
pub fn rename_type(node: &Node, to: &str) -> Node {
    let mut next = node.clone();
    next.ty = to.to_string();
    next
}

/// Rename a prop. No-op when `from` is absent; asserts when `to` is
/// already taken (the unit author must resolve the collision).
pub fn rename_prop(node: &Node, from: &str, to: &str) -> Result<Node, MigrationAssertionError> {
    let mut next = node.clone();

    let Some(value) = next.props.remove(from) else {
        return Ok(next);
    };
    if next.props.contains_key(to) {
        return Err(MigrationAssertionError::PropCollision {
            ty: node.ty.clone(),
            prop: to.to_string(),
        });
    }
    next.props.insert(to.to_string(), value);

    Ok(next)
}

/// Re-home the named prop values under a newly introduced slot,
/// preserving their content unchanged.
///
/// Existing slots contribute their children directly; a struct becomes
/// one child node carrying it as props; a list becomes one child per
/// element; a literal or binding becomes a single-prop child keyed by
/// the prop it came from. Absent props contribute nothing.
pub fn wrap_into_slot(
    node: &Node,
    props: &[&str],
    slot: &str,
    child_type: &str,
) -> Result<Node, MigrationAssertionError> {
    let mut next = node.clone();

    if next.props.contains_key(slot) {
        return Err(MigrationAssertionError::PropCollision {
            ty: node.ty.clone(),
            prop: slot.to_string(),
        });
    }

    let mut children = Vec::new();
    for name in props {
        let Some(value) = next.props.remove(name) else {
            continue;
        };

        match value {
            PropValue::Slot(nodes) => children.extend(nodes),
            PropValue::Struct(map) => children.push(child_from_props(child_type, map)),
            PropValue::List(values) => {
                for value in values {
                    children.push(child_from_value(child_type, name, value));
                }
            }
            other => children.push(child_from_value(child_type, name, other)),
        }
    }

    next.props.insert(slot.to_string(), PropValue::Slot(children));

    Ok(next)
}

/// Decompose a monolithic node: explode a `List` prop into generated
/// children installed under a new zone on the node. Returns `None` when
/// the prop is absent (no-op). The node must already carry an id, since
/// zone keys address nodes by id.
pub fn split_to_zone(
    node: &Node,
    prop: &str,
    zone: &str,
    child_type: &str,
) -> Result<Option<Splice>, MigrationAssertionError> {
    let Some(id) = node.id.clone() else {
        return Err(MigrationAssertionError::MissingId {
            ty: node.ty.clone(),
        });
    };

    let mut parent = node.clone();
    let Some(value) = parent.props.remove(prop) else {
        return Ok(None);
    };

    let PropValue::List(values) = value else {
        return Err(MigrationAssertionError::ShapeMismatch {
            ty: node.ty.clone(),
            prop: prop.to_string(),
            expected: "list",
            found: value.kind().as_str(),
        });
    };

    let children = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let child = child_from_value(child_type, prop, value);
            let id = derive_id(child_type, &format!("{id}:{zone}[{index}]"));
            child.with_id(id)
        })
        .collect();

    Ok(Some(Splice {
        parent,
        children,
        zone_key: ZoneKey::new(id, zone),
    }))
}

/// Fill in a stable id for a node that predates id-bearing documents.
/// The id is derived from the node's type and its traversal path, so
/// re-running the migration on the same input yields the same id.
#[must_use]
pub fn assign_id(node: &Node, path: &[PathSegment]) -> Node {
    if node.id.is_some() {
        return node.clone();
    }

    let id = derive_id(&node.ty, &render_path(path));
    node.clone().with_id(id)
}

/// Convert a bare literal prop into the tri-state binding shape, literal
/// enabled, `field` left empty since no prior binding existed. No-op
/// when the prop is absent or already a binding.
pub fn literal_to_binding(node: &Node, prop: &str) -> Result<Node, MigrationAssertionError> {
    let mut next = node.clone();

    let Some(value) = node.props.get(prop) else {
        return Ok(next);
    };
    if matches!(value, PropValue::Binding(_)) {
        return Ok(next);
    }
    if !value.is_literal() {
        return Err(MigrationAssertionError::ShapeMismatch {
            ty: node.ty.clone(),
            prop: prop.to_string(),
            expected: "literal",
            found: value.kind().as_str(),
        });
    }

    let binding = EntityBinding::constant(value.clone()).map_err(|err| {
        MigrationAssertionError::InvalidBindingConstant {
            prop: prop.to_string(),
            found: err.found,
        }
    })?;
    next.props
        .insert(prop.to_string(), PropValue::Binding(binding));

    Ok(next)
}

fn child_from_props(child_type: &str, props: PropMap) -> Node {
    let mut child = Node::new(child_type);
    child.props = props;
    child
}

fn child_from_value(child_type: &str, prop: &str, value: PropValue) -> Node {
    match value {
        PropValue::Struct(map) => child_from_props(child_type, map),
        other => {
            let mut child = Node::new(child_type);
            child.props.insert(prop.to_string(), other);
            child
        }
    }
}

fn derive_id(ty: &str, seed: &str) -> String {
    let hash = xxh3_64(format!("{ty}\u{0}{seed}").as_bytes());
    format!("n-{hash:016x}")
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_type_keeps_props() {
        let node = Node::new("Hero").with_id("h-1").with_prop("title", "Hi");

        let out = rename_type(&node, "Banner");

        assert_eq!(out.ty, "Banner");
        assert_eq!(out.id, node.id);
        assert_eq!(out.props, node.props);
    }

    #[test]
    fn rename_prop_moves_value() {
        let node = Node::new("Foo").with_prop("title", "Hello");

        let out = rename_prop(&node, "title", "heading").expect("rename should succeed");

        assert!(out.props.get("title").is_none());
        assert_eq!(out.props.get("heading"), Some(&PropValue::from("Hello")));
    }

    #[test]
    fn rename_prop_is_noop_when_absent() {
        let node = Node::new("Foo");

        let out = rename_prop(&node, "title", "heading").expect("rename should succeed");

        assert_eq!(out, node);
    }

    #[test]
    fn rename_prop_rejects_collision() {
        let node = Node::new("Foo")
            .with_prop("title", "a")
            .with_prop("heading", "b");

        let err = rename_prop(&node, "title", "heading").unwrap_err();

        assert!(matches!(err, MigrationAssertionError::PropCollision { .. }));
    }

    #[test]
    fn wrap_into_slot_merges_existing_slot_and_literals() {
        let node = Node::new("Hero")
            .with_prop(
                "media",
                PropValue::Slot(vec![Node::new("Image").with_id("img-1")]),
            )
            .with_prop("caption", "Sunset");

        let out = wrap_into_slot(&node, &["media", "caption"], "body", "Text")
            .expect("wrap should succeed");

        let slot = out.props.get("body").and_then(PropValue::as_slot).expect("slot added");
        assert_eq!(slot.len(), 2);
        assert_eq!(slot[0].ty, "Image");
        assert_eq!(slot[1].ty, "Text");
        assert_eq!(slot[1].props.get("caption"), Some(&PropValue::from("Sunset")));
        assert!(out.props.get("media").is_none());
        assert!(out.props.get("caption").is_none());
    }

    #[test]
    fn wrap_into_slot_skips_absent_props() {
        let node = Node::new("Hero");

        let out = wrap_into_slot(&node, &["missing"], "body", "Text").expect("wrap should succeed");

        assert_eq!(out.props.get("body"), Some(&PropValue::Slot(vec![])));
    }

    #[test]
    fn split_to_zone_explodes_list_prop() {
        let node = Node::new("Columns").with_id("cols-1").with_prop(
            "columns",
            PropValue::List(vec![
                PropValue::Struct(
                    [("span".to_string(), PropValue::from(6i64))].into_iter().collect(),
                ),
                PropValue::Struct(
                    [("span".to_string(), PropValue::from(6i64))].into_iter().collect(),
                ),
            ]),
        );

        let splice = split_to_zone(&node, "columns", "columns", "Column")
            .expect("split should succeed")
            .expect("prop present");

        assert_eq!(splice.zone_key, ZoneKey::new("cols-1", "columns"));
        assert!(splice.parent.props.get("columns").is_none());
        assert_eq!(splice.children.len(), 2);
        assert_eq!(splice.children[0].ty, "Column");
        assert!(splice.children[0].id.is_some());
        assert_ne!(splice.children[0].id, splice.children[1].id);
    }

    #[test]
    fn split_to_zone_is_deterministic() {
        let node = Node::new("Columns")
            .with_id("cols-1")
            .with_prop("columns", PropValue::List(vec![PropValue::from(1i64)]));

        let a = split_to_zone(&node, "columns", "columns", "Column").unwrap().unwrap();
        let b = split_to_zone(&node, "columns", "columns", "Column").unwrap().unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn split_to_zone_requires_id() {
        let node = Node::new("Columns").with_prop("columns", PropValue::List(vec![]));

        let err = split_to_zone(&node, "columns", "columns", "Column").unwrap_err();

        assert!(matches!(err, MigrationAssertionError::MissingId { .. }));
    }

    #[test]
    fn split_to_zone_noops_on_absent_prop() {
        let node = Node::new("Columns").with_id("cols-1");

        let out = split_to_zone(&node, "columns", "columns", "Column").expect("no-op");

        assert!(out.is_none());
    }

    #[test]
    fn split_to_zone_asserts_on_non_list() {
        let node = Node::new("Columns")
            .with_id("cols-1")
            .with_prop("columns", PropValue::from("two"));

        let err = split_to_zone(&node, "columns", "columns", "Column").unwrap_err();

        assert!(matches!(
            err,
            MigrationAssertionError::ShapeMismatch { expected: "list", .. }
        ));
    }

    #[test]
    fn assign_id_is_stable_and_respects_existing_ids() {
        let node = Node::new("Text");
        let path = [PathSegment::Index(0), PathSegment::Field("body".to_string())];

        let a = assign_id(&node, &path);
        let b = assign_id(&node, &path);
        assert_eq!(a.id, b.id);
        assert!(a.id.as_deref().is_some_and(|id| id.starts_with("n-")));

        let owned = Node::new("Text").with_id("keep-me");
        assert_eq!(assign_id(&owned, &path).id.as_deref(), Some("keep-me"));
    }

    #[test]
    fn assign_id_differs_by_path_and_type() {
        let node = Node::new("Text");
        let a = assign_id(&node, &[PathSegment::Index(0)]);
        let b = assign_id(&node, &[PathSegment::Index(1)]);
        let c = assign_id(&Node::new("Image"), &[PathSegment::Index(0)]);

        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn literal_to_binding_wraps_literal() {
        let node = Node::new("Foo").with_prop("title", "Hello");

        let out = literal_to_binding(&node, "title").expect("conversion should succeed");

        let expected = EntityBinding::constant(PropValue::from("Hello")).expect("literal");
        assert_eq!(out.props.get("title"), Some(&PropValue::Binding(expected)));
    }

    #[test]
    fn literal_to_binding_noops_on_absent_or_bound_props() {
        let node = Node::new("Foo");
        assert_eq!(literal_to_binding(&node, "title").expect("no-op"), node);

        let bound = Node::new("Foo").with_prop(
            "title",
            PropValue::Binding(EntityBinding::constant(PropValue::from("x")).expect("literal")),
        );
        assert_eq!(literal_to_binding(&bound, "title").expect("no-op"), bound);
    }

    #[test]
    fn literal_to_binding_asserts_on_composite() {
        let node = Node::new("Foo").with_prop("title", PropValue::List(vec![]));

        let err = literal_to_binding(&node, "title").unwrap_err();

        assert!(matches!(
            err,
            MigrationAssertionError::ShapeMismatch { expected: "literal", .. }
        ));
    }
}
