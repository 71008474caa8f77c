//! Migration runner: reads a document's stored version, applies the
//! applicable contiguous slice of the registry in order, and returns a
//! current-version document or a structured failure. Pure and
//! synchronous; the caller's document is borrowed and never mutated.

use crate::{
    error::MigrateError,
    registry::MigrationRegistry,
    unit::MigrationContext,
};
use pagecraft_core::{
    business::BusinessDocument,
    catalog::ComponentRegistry,
    document::{Document, Node},
    error::{MigrationAssertionError, StructuralError},
    obs::{MetricsEvent, record},
    walk::{self, CollectionKind, NodeVisitor, PathSegment, VisitAction},
};

/// Bring `document` forward to the registry's current version.
///
/// Fails without a partial result: a half-migrated document with an
/// advanced version number would be indistinguishable from a fully
/// migrated one and silently corrupt every later migration. Calling this
/// on an already-current document is a structurally identical no-op, so
/// the whole operation is idempotent.
pub fn migrate(
    document: &Document,
    registry: &MigrationRegistry,
    components: &dyn ComponentRegistry,
    business: Option<&BusinessDocument>,
) -> Result<Document, MigrateError> {
    let found = document.root.version();
    let current = registry.current_version();

    if found > current {
        return Err(MigrateError::VersionSkew { found, current });
    }

    record(MetricsEvent::RunStarted {
        from_version: found,
        to_version: current,
    });

    if found == current {
        record(MetricsEvent::RunCompleted);
        return Ok(document.clone());
    }

    let ctx = MigrationContext {
        components,
        business,
    };

    let mut doc = document.clone();
    let mut index = found;
    for unit in registry.applicable(found) {
        doc = unit.migrate(&doc, &ctx)?;
        reject_dangling_zones(&doc)?;
        record(MetricsEvent::UnitApplied { index });
        index += 1;
    }

    validate_types(&doc, components)?;

    doc.root.set_version(current);
    record(MetricsEvent::RunCompleted);

    Ok(doc)
}

/// A zone key whose owner no longer exists means the unit that removed
/// or renamed the owner failed to prune the zone.
fn reject_dangling_zones(document: &Document) -> Result<(), MigrateError> {
    match document.dangling_zones().into_iter().next() {
        Some(key) => Err(StructuralError::DanglingZone {
            key: key.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Every node type left in the tree must be one the component catalog
/// currently recognizes.
fn validate_types(
    document: &Document,
    components: &dyn ComponentRegistry,
) -> Result<(), MigrateError> {
    struct TypeCheck<'a> {
        components: &'a dyn ComponentRegistry,
    }

    impl NodeVisitor for TypeCheck<'_> {
        fn visit(
            &mut self,
            node: &Node,
            _: &[PathSegment],
            _: CollectionKind,
        ) -> Result<VisitAction, MigrationAssertionError> {
            if self.components.contains(&node.ty) {
                Ok(VisitAction::Keep)
            } else {
                Err(MigrationAssertionError::UnknownType {
                    ty: node.ty.clone(),
                })
            }
        }
    }

    let mut check = TypeCheck { components };
    walk::traverse(document, &mut check)?;

    Ok(())
}
