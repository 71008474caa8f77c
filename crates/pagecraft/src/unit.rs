use crate::error::MigrateError;
use pagecraft_core::{
    business::BusinessDocument,
    catalog::ComponentRegistry,
    document::{Document, Node},
    error::MigrationAssertionError,
    walk::{self, CollectionKind, NodeVisitor, PathSegment, VisitAction},
};

///
/// MigrationContext
///
/// Read-only collaborators handed to every unit: the component catalog
/// (current shapes and defaults) and, when the caller supplies one, the
/// business document.
///

pub struct MigrationContext<'a> {
    pub components: &'a dyn ComponentRegistry,
    pub business: Option<&'a BusinessDocument>,
}

///
/// MigrationUnit
///
/// One pure transform from document-at-version-N to document-at-version
/// N+1. A unit is identified only by its position in the registry; it
/// carries no version field of its own.
///
/// Requirements: determinism (same inputs, same output; no randomness,
/// clocks, or hidden global reads), totality (absent targeted shapes are
/// no-ops), and read-only use of the context.
///

pub trait MigrationUnit {
    /// Human-readable name, for diagnostics only.
    fn name(&self) -> &'static str;

    /// Optional node-type filter. Purely a traversal optimization: a
    /// filtered unit must produce the same document it would as a
    /// whole-document transform.
    fn types(&self) -> Option<&[&'static str]> {
        None
    }

    fn migrate(
        &self,
        document: &Document,
        ctx: &MigrationContext<'_>,
    ) -> Result<Document, MigrateError>;
}

///
/// NodeUnit
///
/// The common authoring shape: a per-node visit function lifted to a
/// whole-document unit via the tree walker.
///

pub struct NodeUnit<F> {
    name: &'static str,
    types: Option<Vec<&'static str>>,
    visit: F,
}

impl<F> NodeUnit<F>
where
    F: Fn(
        &Node,
        &[PathSegment],
        CollectionKind,
        &MigrationContext<'_>,
    ) -> Result<VisitAction, MigrationAssertionError>,
{
    pub const fn new(name: &'static str, visit: F) -> Self {
        Self {
            name,
            types: None,
            visit,
        }
    }

    /// Restrict the visit function to the given node types; other nodes
    /// are kept untouched without calling it.
    #[must_use]
    pub fn with_types(mut self, types: &[&'static str]) -> Self {
        self.types = Some(types.to_vec());
        self
    }
}

impl<F> MigrationUnit for NodeUnit<F>
where
    F: Fn(
        &Node,
        &[PathSegment],
        CollectionKind,
        &MigrationContext<'_>,
    ) -> Result<VisitAction, MigrationAssertionError>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn types(&self) -> Option<&[&'static str]> {
        self.types.as_deref()
    }

    fn migrate(
        &self,
        document: &Document,
        ctx: &MigrationContext<'_>,
    ) -> Result<Document, MigrateError> {
        let mut visitor = FilteredVisitor { unit: self, ctx };

        walk::traverse(document, &mut visitor).map_err(MigrateError::from)
    }
}

///
/// FilteredVisitor
///

struct FilteredVisitor<'a, F> {
    unit: &'a NodeUnit<F>,
    ctx: &'a MigrationContext<'a>,
}

impl<F> NodeVisitor for FilteredVisitor<'_, F>
where
    F: Fn(
        &Node,
        &[PathSegment],
        CollectionKind,
        &MigrationContext<'_>,
    ) -> Result<VisitAction, MigrationAssertionError>,
{
    fn visit(
        &mut self,
        node: &Node,
        path: &[PathSegment],
        kind: CollectionKind,
    ) -> Result<VisitAction, MigrationAssertionError> {
        if let Some(types) = &self.unit.types
            && !types.contains(&node.ty.as_str())
        {
            return Ok(VisitAction::Keep);
        }

        (self.unit.visit)(node, path, kind, self.ctx)
    }
}

///
/// TESTS
///
