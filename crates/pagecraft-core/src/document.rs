use crate::{
    error::StructuralError,
    value::{PropMap, PropValue},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

///
/// Node
///
/// A typed, property-bearing unit in the page tree. `id` is optional on
/// the wire: the oldest documents predate id-bearing nodes, and the
/// `assign-id` edit fills them in during migration.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "PropMap::is_empty")]
    pub props: PropMap,
}

impl Node {
    #[must_use]
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            id: None,
            ty: ty.into(),
            props: PropMap::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

///
/// ZoneKey
///
/// Address of an externally keyed child collection: the owning node's id
/// plus the zone name, `"<nodeId>:<zoneName>"` on the wire.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ZoneKey {
    pub node_id: String,
    pub zone: String,
}

impl ZoneKey {
    #[must_use]
    pub fn new(node_id: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            zone: zone.into(),
        }
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.zone)
    }
}

impl FromStr for ZoneKey {
    type Err = StructuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((node_id, zone)) if !node_id.is_empty() && !zone.is_empty() => {
                Ok(Self::new(node_id, zone))
            }
            _ => Err(StructuralError::MalformedZoneKey { key: s.to_string() }),
        }
    }
}

///
/// ZoneMap
///
/// Insertion-ordered map of zone key → child list. Zone children are not
/// embedded in any node's props; they hang off the owning node's id.
///

#[derive(
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::DerefMut,
)]
#[serde(transparent)]
pub struct ZoneMap(IndexMap<ZoneKey, Vec<Node>>);

impl ZoneMap {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zones owned by the given node id, in insertion order.
    pub fn owned_by<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = (&'a ZoneKey, &'a [Node])> {
        self.0
            .iter()
            .filter(move |(key, _)| key.node_id == node_id)
            .map(|(key, nodes)| (key, nodes.as_slice()))
    }

    /// Drop every zone owned by the given node id.
    pub fn remove_owned_by(&mut self, node_id: &str) {
        self.0.retain(|key, _| key.node_id != node_id);
    }
}

impl FromIterator<(ZoneKey, Vec<Node>)> for ZoneMap {
    fn from_iter<I: IntoIterator<Item = (ZoneKey, Vec<Node>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// Root
///
/// Document-level wrapper holding the schema version alongside any other
/// root-scoped props.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default, skip_serializing_if = "PropMap::is_empty")]
    pub props: PropMap,
}

impl Root {
    pub const VERSION_PROP: &'static str = "version";

    /// Stored schema version. The very oldest documents carry no version
    /// prop at all; they are version 0.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.props
            .get(Self::VERSION_PROP)
            .and_then(PropValue::as_u32)
            .unwrap_or(0)
    }

    pub fn set_version(&mut self, version: u32) {
        self.props
            .insert(Self::VERSION_PROP.to_string(), PropValue::from(u64::from(version)));
    }
}

///
/// Document
///
/// One persisted page: root (version carrier), ordered top-level nodes,
/// and the zone map for variable-arity nested content.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub root: Root,

    #[serde(default)]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "ZoneMap::is_empty")]
    pub zones: ZoneMap,
}

impl Document {
    /// Every node id reachable from the document: top-level content,
    /// slot children at any depth, and nodes living inside zone entries.
    #[must_use]
    pub fn node_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();

        for node in &self.content {
            collect_ids(node, &mut ids);
        }
        for nodes in self.zones.values() {
            for node in nodes {
                collect_ids(node, &mut ids);
            }
        }

        ids
    }

    /// Zone keys whose owning node id no longer exists anywhere in the
    /// tree. Must be empty at rest.
    #[must_use]
    pub fn dangling_zones(&self) -> Vec<ZoneKey> {
        let ids = self.node_ids();

        self.zones
            .keys()
            .filter(|key| !ids.contains(&key.node_id))
            .cloned()
            .collect()
    }
}

fn collect_ids(node: &Node, ids: &mut BTreeSet<String>) {
    if let Some(id) = &node.id {
        ids.insert(id.clone());
    }
    for (_, value) in &node.props {
        collect_ids_in_value(value, ids);
    }
}

fn collect_ids_in_value(value: &PropValue, ids: &mut BTreeSet<String>) {
    match value {
        PropValue::Slot(nodes) => {
            for node in nodes {
                collect_ids(node, ids);
            }
        }
        PropValue::List(values) => {
            for value in values {
                collect_ids_in_value(value, ids);
            }
        }
        PropValue::Struct(map) => {
            for (_, value) in map {
                collect_ids_in_value(value, ids);
            }
        }
        _ => {}
    }
}

///
/// TESTS
///
