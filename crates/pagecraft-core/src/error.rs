use thiserror::Error as ThisError;

///
/// StructuralError
///
/// Fatal tree-shape violations. Any of these aborts the whole migration
/// run with no partial result: a half-migrated document carrying an
/// advanced version number would silently corrupt every later migration.
///

#[remain::sorted]
#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
pub enum StructuralError {
    /// A node id recurred on its own ancestor chain while traversing
    /// zone entries. The model is defined to be acyclic; a cycle means a
    /// defective migration manufactured one.
    #[error("cycle detected: node id {node_id:?} recurs on its own ancestor chain")]
    CycleDetected { node_id: String },

    /// A zone key references a node id that no longer exists in the tree.
    #[error("zone key {key:?} references a node id that does not exist")]
    DanglingZone { key: String },

    /// Traversal exceeded the safety depth cap.
    #[error("traversal depth exceeded the safety cap of {cap}")]
    DepthExceeded { cap: usize },

    /// A zone key string did not parse as `<nodeId>:<zoneName>`.
    #[error("malformed zone key {key:?}: expected \"<nodeId>:<zoneName>\"")]
    MalformedZoneKey { key: String },
}

///
/// MigrationAssertionError
///
/// A migration unit's shape assumptions were violated. This is a defect
/// in the unit's authoring, not a normal data condition: units no-op on
/// genuinely optional shapes and assert loudly on clearly-invalid ones.
///

#[remain::sorted]
#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
pub enum MigrationAssertionError {
    /// An entity binding's constant value was not a literal.
    #[error("binding constant for prop {prop:?} must be a literal, found {found}")]
    InvalidBindingConstant { prop: String, found: &'static str },

    /// An edit required the node to carry an id and it had none.
    #[error("node of type {ty:?} has no id; assign ids before zone edits")]
    MissingId { ty: String },

    /// A required field was absent after migration.
    #[error("node of type {ty:?} is missing required prop {prop:?}")]
    MissingProp { ty: String, prop: String },

    /// An edit would have overwritten an existing prop.
    #[error("prop {prop:?} already exists on node of type {ty:?}")]
    PropCollision { ty: String, prop: String },

    /// A prop did not have the shape the unit expected.
    #[error("prop {prop:?} on node of type {ty:?}: expected {expected}, found {found}")]
    ShapeMismatch {
        ty: String,
        prop: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A node's type is not known to the component catalog.
    #[error("node type {ty:?} is not known to the component catalog")]
    UnknownType { ty: String },
}
