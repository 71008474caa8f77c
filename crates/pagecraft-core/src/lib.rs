//! Core document model for the pagecraft migration engine: prop values,
//! nodes, zones, the tree walker, structural-edit primitives, and the
//! vocabulary exported via the `prelude`.

pub mod business;
pub mod catalog;
pub mod document;
pub mod edit;
pub mod error;
pub mod obs;
pub mod value;
pub mod walk;
mod wire;

///
/// CONSTANTS
///

/// Maximum traversal depth accepted by the tree walker.
///
/// Page trees are shallow in practice; the cap exists so a defective
/// migration that manufactures a zone cycle fails fast instead of
/// recursing until the stack gives out.
pub const MAX_TRAVERSE_DEPTH: usize = 64;

///
/// Prelude
///
/// Domain vocabulary only. No walkers, sinks, or wire helpers are
/// re-exported here.
///

pub mod prelude {
    pub use crate::{
        business::BusinessDocument,
        catalog::{ComponentCatalog, ComponentDef, ComponentRegistry, FieldDef, FieldKind},
        document::{Document, Node, Root, ZoneKey, ZoneMap},
        error::{MigrationAssertionError, StructuralError},
        value::{EntityBinding, PropKind, PropMap, PropValue},
    };
}
