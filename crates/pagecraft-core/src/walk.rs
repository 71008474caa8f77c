//! Tree walker: depth-first, pre-order traversal over a document that
//! visits slot-nested and zone-addressed subtrees uniformly. Callers
//! return a `VisitAction` per node; every edit produces new values, the
//! input document is never touched.

use crate::{
    MAX_TRAVERSE_DEPTH,
    document::{Document, Node, ZoneKey, ZoneMap},
    error::{MigrationAssertionError, StructuralError},
    obs::{MetricsEvent, record},
    value::{PropMap, PropValue},
};
use std::collections::BTreeSet;
use std::fmt::Write;
use thiserror::Error as ThisError;

///
/// WalkError
///

#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
pub enum WalkError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Assertion(#[from] MigrationAssertionError),
}

///
/// CollectionKind
///
/// Which child-collection mechanism the visited node sits in. Most
/// visitors ignore this; it exists so a migration can treat slot and
/// zone children differently when it must.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CollectionKind {
    /// Top-level `content` list of the document.
    Content,
    /// Fixed-name slot embedded in a node's props.
    Slot,
    /// Externally keyed zone entry.
    Zone,
}

///
/// PathSegment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Zone(String),
}

/// Render a path for diagnostics: `content[0].header[1]@items[2]`.
#[must_use]
pub fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::from("content");

    for seg in path {
        match seg {
            PathSegment::Field(name) => {
                out.push('.');
                out.push_str(name);
            }
            PathSegment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
            PathSegment::Zone(zone) => {
                out.push('@');
                out.push_str(zone);
            }
        }
    }

    out
}

///
/// Splice
///
/// Replacement of one node by a parent plus generated children installed
/// under a newly introduced zone. Children are authored for the
/// post-migration shape and are not re-visited.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Splice {
    pub parent: Node,
    pub children: Vec<Node>,
    pub zone_key: ZoneKey,
}

///
/// VisitAction
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VisitAction {
    /// Leave the node as-is and recurse into its children.
    Keep,
    /// Substitute the node; traversal recurses into the replacement.
    Replace(Node),
    /// Remove the node together with every zone it (or any descendant)
    /// owns.
    Delete,
    /// Substitute the parent and install generated children into a zone.
    Splice(Splice),
}

///
/// NodeVisitor
///

pub trait NodeVisitor {
    fn visit(
        &mut self,
        node: &Node,
        path: &[PathSegment],
        kind: CollectionKind,
    ) -> Result<VisitAction, MigrationAssertionError>;
}

impl<F> NodeVisitor for F
where
    F: FnMut(&Node, &[PathSegment], CollectionKind) -> Result<VisitAction, MigrationAssertionError>,
{
    fn visit(
        &mut self,
        node: &Node,
        path: &[PathSegment],
        kind: CollectionKind,
    ) -> Result<VisitAction, MigrationAssertionError> {
        self(node, path, kind)
    }
}

/// Traverse `document` depth-first, pre-order, producing a new document.
///
/// Every top-level node is visited, then for each node every slot found
/// anywhere inside its props, then every zone entry keyed by its id,
/// before the next sibling. Absent props and absent zone entries are
/// tolerated. Zone entries whose owner is never visited are carried
/// through unchanged; pruning them is the responsibility of whichever
/// migration orphaned them, and the runner reports the ones left behind.
pub fn traverse(
    document: &Document,
    visitor: &mut dyn NodeVisitor,
) -> Result<Document, WalkError> {
    let mut walker = Walker {
        visitor,
        zones_in: &document.zones,
        zones_out: ZoneMap::new(),
        consumed: BTreeSet::new(),
        path: Vec::new(),
        ancestors: Vec::new(),
        depth: 0,
    };

    let content = walker.walk_nodes(&document.content, CollectionKind::Content)?;

    let Walker {
        mut zones_out,
        consumed,
        ..
    } = walker;

    for (key, nodes) in document.zones.iter() {
        if !consumed.contains(key) {
            zones_out.insert(key.clone(), nodes.clone());
        }
    }

    Ok(Document {
        root: document.root.clone(),
        content,
        zones: zones_out,
    })
}

///
/// Walker
///

struct Walker<'a> {
    visitor: &'a mut dyn NodeVisitor,
    zones_in: &'a ZoneMap,
    zones_out: ZoneMap,
    /// Input zone keys that were traversed (or deliberately dropped).
    consumed: BTreeSet<ZoneKey>,
    path: Vec<PathSegment>,
    /// Node ids on the current ancestor chain, for cycle detection.
    ancestors: Vec<String>,
    depth: usize,
}

impl Walker<'_> {
    fn walk_nodes(
        &mut self,
        nodes: &[Node],
        kind: CollectionKind,
    ) -> Result<Vec<Node>, WalkError> {
        let mut out = Vec::with_capacity(nodes.len());

        for (index, node) in nodes.iter().enumerate() {
            self.path.push(PathSegment::Index(index));
            let kept = self.walk_node(node, kind);
            self.path.pop();

            if let Some(node) = kept? {
                out.push(node);
            }
        }

        Ok(out)
    }

    fn walk_node(
        &mut self,
        node: &Node,
        kind: CollectionKind,
    ) -> Result<Option<Node>, WalkError> {
        record(MetricsEvent::NodeVisited);

        match self.visitor.visit(node, &self.path, kind)? {
            VisitAction::Keep => self.descend(node.clone()).map(Some),
            VisitAction::Replace(next) => {
                record(MetricsEvent::NodeReplaced);
                self.descend(next).map(Some)
            }
            VisitAction::Delete => {
                record(MetricsEvent::NodeDeleted);
                self.consume_zones(node);
                Ok(None)
            }
            VisitAction::Splice(splice) => {
                record(MetricsEvent::ZoneSpliced);
                let parent = self.descend(splice.parent)?;
                self.zones_out.insert(splice.zone_key, splice.children);
                Ok(Some(parent))
            }
        }
    }

    /// Recurse into a node's slot props and its zone entries.
    fn descend(&mut self, node: Node) -> Result<Node, WalkError> {
        if let Some(id) = &node.id
            && self.ancestors.iter().any(|a| a == id)
        {
            return Err(StructuralError::CycleDetected {
                node_id: id.clone(),
            }
            .into());
        }

        self.depth += 1;
        if self.depth > MAX_TRAVERSE_DEPTH {
            return Err(StructuralError::DepthExceeded {
                cap: MAX_TRAVERSE_DEPTH,
            }
            .into());
        }

        let pushed_ancestor = node.id.is_some();
        if let Some(id) = &node.id {
            self.ancestors.push(id.clone());
        }

        let result = self.descend_inner(node);

        if pushed_ancestor {
            self.ancestors.pop();
        }
        self.depth -= 1;

        result
    }

    fn descend_inner(&mut self, mut node: Node) -> Result<Node, WalkError> {
        let props = std::mem::take(&mut node.props);
        let mut out = PropMap::new();

        for (key, value) in props {
            self.path.push(PathSegment::Field(key.clone()));
            let value = self.walk_value(value);
            self.path.pop();
            out.insert(key, value?);
        }
        node.props = out;

        if let Some(id) = node.id.clone() {
            self.walk_zones_of(&id)?;
        }

        Ok(node)
    }

    fn walk_value(&mut self, value: PropValue) -> Result<PropValue, WalkError> {
        match value {
            PropValue::Slot(nodes) => {
                let nodes = self.walk_nodes(&nodes, CollectionKind::Slot)?;
                Ok(PropValue::Slot(nodes))
            }
            PropValue::List(values) => {
                let mut out = Vec::with_capacity(values.len());
                for (index, value) in values.into_iter().enumerate() {
                    self.path.push(PathSegment::Index(index));
                    let value = self.walk_value(value);
                    self.path.pop();
                    out.push(value?);
                }
                Ok(PropValue::List(out))
            }
            PropValue::Struct(map) => {
                let mut out = PropMap::new();
                for (key, value) in map {
                    self.path.push(PathSegment::Field(key.clone()));
                    let value = self.walk_value(value);
                    self.path.pop();
                    out.insert(key, value?);
                }
                Ok(PropValue::Struct(out))
            }
            other => Ok(other),
        }
    }

    fn walk_zones_of(&mut self, node_id: &str) -> Result<(), WalkError> {
        let zones_in = self.zones_in;
        let entries: Vec<(ZoneKey, Vec<Node>)> = zones_in
            .owned_by(node_id)
            .map(|(key, nodes)| (key.clone(), nodes.to_vec()))
            .collect();

        for (key, nodes) in entries {
            self.consumed.insert(key.clone());
            self.path.push(PathSegment::Zone(key.zone.clone()));
            let walked = self.walk_nodes(&nodes, CollectionKind::Zone);
            self.path.pop();
            self.zones_out.insert(key, walked?);
        }

        Ok(())
    }

    /// Mark every zone owned by `node` or any of its descendants as
    /// consumed without copying it to the output: the subtree is gone.
    fn consume_zones(&mut self, node: &Node) {
        if let Some(id) = &node.id {
            let zones_in = self.zones_in;
            let entries: Vec<(ZoneKey, Vec<Node>)> = zones_in
                .owned_by(id)
                .map(|(key, nodes)| (key.clone(), nodes.to_vec()))
                .collect();

            for (key, nodes) in entries {
                self.consumed.insert(key);
                for child in &nodes {
                    self.consume_zones(child);
                }
            }
        }

        for (_, value) in &node.props {
            self.consume_zones_in_value(value);
        }
    }

    fn consume_zones_in_value(&mut self, value: &PropValue) {
        match value {
            PropValue::Slot(nodes) => {
                for node in nodes {
                    self.consume_zones(node);
                }
            }
            PropValue::List(values) => {
                for value in values {
                    self.consume_zones_in_value(value);
                }
            }
            PropValue::Struct(map) => {
                for (_, value) in map {
                    self.consume_zones_in_value(value);
                }
            }
            _ => {}
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Root;

    fn keep_all(
        _: &Node,
        _: &[PathSegment],
        _: CollectionKind,
    ) -> Result<VisitAction, MigrationAssertionError> {
        Ok(VisitAction::Keep)
    }

    fn doc_with_zones() -> Document {
        let grid = Node::new("Grid").with_id("grid-1").with_prop(
            "header",
            PropValue::Slot(vec![Node::new("Text").with_id("text-1")]),
        );

        Document {
            root: Root::default(),
            content: vec![grid],
            zones: [
                (
                    ZoneKey::new("grid-1", "items"),
                    vec![Node::new("Card").with_id("card-1")],
                ),
                (
                    ZoneKey::new("card-1", "footer"),
                    vec![Node::new("Text").with_id("text-2")],
                ),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn keep_is_identity() {
        let doc = doc_with_zones();

        let out = traverse(&doc, &mut keep_all).expect("traversal should succeed");

        assert_eq!(out, doc);
    }

    #[test]
    fn visits_slots_and_zones_with_kinds() {
        let doc = doc_with_zones();
        let mut seen: Vec<(String, CollectionKind)> = Vec::new();

        traverse(
            &doc,
            &mut |node: &Node,
                  _: &[PathSegment],
                  kind: CollectionKind|
                  -> Result<VisitAction, MigrationAssertionError> {
                seen.push((node.ty.clone(), kind));
                Ok(VisitAction::Keep)
            },
        )
        .expect("traversal should succeed");

        assert_eq!(
            seen,
            vec![
                ("Grid".to_string(), CollectionKind::Content),
                ("Text".to_string(), CollectionKind::Slot),
                ("Card".to_string(), CollectionKind::Zone),
                ("Text".to_string(), CollectionKind::Zone),
            ]
        );
    }

    #[test]
    fn paths_locate_nested_nodes() {
        let doc = doc_with_zones();
        let mut paths = Vec::new();

        traverse(
            &doc,
            &mut |node: &Node,
                  path: &[PathSegment],
                  _: CollectionKind|
                  -> Result<VisitAction, MigrationAssertionError> {
                paths.push((node.id.clone(), render_path(path)));
                Ok(VisitAction::Keep)
            },
        )
        .expect("traversal should succeed");

        assert!(paths.contains(&(Some("text-1".to_string()), "content[0].header[0]".to_string())));
        assert!(paths.contains(&(Some("card-1".to_string()), "content[0]@items[0]".to_string())));
        assert!(
            paths.contains(&(Some("text-2".to_string()), "content[0]@items[0]@footer[0]".to_string()))
        );
    }

    #[test]
    fn delete_removes_owned_zones_recursively() {
        let doc = doc_with_zones();

        let out = traverse(
            &doc,
            &mut |node: &Node,
                  _: &[PathSegment],
                  _: CollectionKind|
                  -> Result<VisitAction, MigrationAssertionError> {
                if node.ty == "Card" {
                    Ok(VisitAction::Delete)
                } else {
                    Ok(VisitAction::Keep)
                }
            },
        )
        .expect("traversal should succeed");

        let key = ZoneKey::new("grid-1", "items");
        assert_eq!(out.zones.get(&key).map(Vec::len), Some(0));
        assert!(!out.zones.contains_key(&ZoneKey::new("card-1", "footer")));
        assert!(out.dangling_zones().is_empty());
    }

    #[test]
    fn replace_recurses_into_replacement() {
        let doc = doc_with_zones();

        let out = traverse(
            &doc,
            &mut |node: &Node,
                  _: &[PathSegment],
                  _: CollectionKind|
                  -> Result<VisitAction, MigrationAssertionError> {
                match node.ty.as_str() {
                    "Grid" => {
                        let mut next = node.clone();
                        next.ty = "Layout".to_string();
                        Ok(VisitAction::Replace(next))
                    }
                    "Text" => {
                        let mut next = node.clone();
                        next.props.insert("seen".to_string(), PropValue::Bool(true));
                        Ok(VisitAction::Replace(next))
                    }
                    _ => Ok(VisitAction::Keep),
                }
            },
        )
        .expect("traversal should succeed");

        assert_eq!(out.content[0].ty, "Layout");
        let header = out.content[0].props.get("header").and_then(PropValue::as_slot);
        let header = header.expect("header slot survives");
        assert_eq!(header[0].props.get("seen"), Some(&PropValue::Bool(true)));
    }

    #[test]
    fn splice_installs_children_without_revisiting() {
        let doc = Document {
            root: Root::default(),
            content: vec![Node::new("Legacy").with_id("legacy-1")],
            zones: ZoneMap::new(),
        };
        let mut visits = 0usize;

        let out = traverse(
            &doc,
            &mut |node: &Node,
                  _: &[PathSegment],
                  _: CollectionKind|
                  -> Result<VisitAction, MigrationAssertionError> {
                visits += 1;
                if node.ty == "Legacy" {
                    Ok(VisitAction::Splice(Splice {
                        parent: Node::new("Modern").with_id("legacy-1"),
                        children: vec![Node::new("Item").with_id("item-1")],
                        zone_key: ZoneKey::new("legacy-1", "entries"),
                    }))
                } else {
                    Ok(VisitAction::Keep)
                }
            },
        )
        .expect("traversal should succeed");

        assert_eq!(visits, 1);
        assert_eq!(out.content[0].ty, "Modern");
        let key = ZoneKey::new("legacy-1", "entries");
        assert_eq!(out.zones.get(&key).map(Vec::len), Some(1));
        assert!(out.dangling_zones().is_empty());
    }

    #[test]
    fn unvisited_zone_entries_are_carried_through() {
        let doc = Document {
            root: Root::default(),
            content: vec![Node::new("Hero").with_id("hero-1")],
            zones: [(ZoneKey::new("orphan", "items"), vec![])].into_iter().collect(),
        };

        let out = traverse(&doc, &mut keep_all).expect("traversal should succeed");

        assert!(out.zones.contains_key(&ZoneKey::new("orphan", "items")));
        assert_eq!(out.dangling_zones(), vec![ZoneKey::new("orphan", "items")]);
    }

    #[test]
    fn zone_cycle_is_detected() {
        // a:main contains b, b:main contains a node reusing id "a".
        let doc = Document {
            root: Root::default(),
            content: vec![Node::new("Box").with_id("a")],
            zones: [
                (ZoneKey::new("a", "main"), vec![Node::new("Box").with_id("b")]),
                (ZoneKey::new("b", "main"), vec![Node::new("Box").with_id("a")]),
            ]
            .into_iter()
            .collect(),
        };

        let err = traverse(&doc, &mut keep_all).unwrap_err();

        assert_eq!(
            err,
            WalkError::Structural(StructuralError::CycleDetected {
                node_id: "a".to_string()
            })
        );
    }

    #[test]
    fn depth_cap_aborts_runaway_recursion() {
        // A slot chain deeper than the cap, with no repeated ids.
        let mut node = Node::new("Leaf").with_id("leaf");
        for depth in 0..MAX_TRAVERSE_DEPTH + 1 {
            node = Node::new("Wrap")
                .with_id(format!("wrap-{depth}"))
                .with_prop("child", PropValue::Slot(vec![node]));
        }
        let doc = Document {
            root: Root::default(),
            content: vec![node],
            zones: ZoneMap::new(),
        };

        let err = traverse(&doc, &mut keep_all).unwrap_err();

        assert_eq!(
            err,
            WalkError::Structural(StructuralError::DepthExceeded {
                cap: MAX_TRAVERSE_DEPTH
            })
        );
    }
}
