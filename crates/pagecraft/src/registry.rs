use crate::unit::MigrationUnit;

///
/// MigrationRegistry
///
/// The explicit, ordered, immutable list of migration units. List
/// position is the contract: the unit at index `i` transforms documents
/// from version `i` to `i + 1`, and the registry length is by definition
/// the current schema version. Appending at the end is the only
/// supported evolution; reordering or removing entries breaks every
/// previously saved document.
///

pub struct MigrationRegistry {
    units: Vec<Box<dyn MigrationUnit>>,
}

impl MigrationRegistry {
    #[must_use]
    pub fn new(units: Vec<Box<dyn MigrationUnit>>) -> Self {
        Self { units }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self { units: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The current schema version: the number of units ever registered.
    #[must_use]
    pub fn current_version(&self) -> u32 {
        u32::try_from(self.units.len()).unwrap_or(u32::MAX)
    }

    /// The contiguous slice of units to apply to a document currently at
    /// `from_version`.
    #[must_use]
    pub fn applicable(&self, from_version: u32) -> &[Box<dyn MigrationUnit>] {
        usize::try_from(from_version)
            .ok()
            .and_then(|start| self.units.get(start..))
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn MigrationUnit> {
        self.units.iter().map(Box::as_ref)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{MigrationContext, NodeUnit};
    use pagecraft_core::{
        document::Node,
        error::MigrationAssertionError,
        walk::{CollectionKind, PathSegment, VisitAction},
    };

    fn noop(name: &'static str) -> Box<dyn MigrationUnit> {
        Box::new(NodeUnit::new(
            name,
            |_: &Node,
             _: &[PathSegment],
             _: CollectionKind,
             _: &MigrationContext<'_>|
             -> Result<VisitAction, MigrationAssertionError> {
                Ok(VisitAction::Keep)
            },
        ))
    }

    #[test]
    fn registry_length_is_the_current_version() {
        let registry = MigrationRegistry::new(vec![noop("a"), noop("b"), noop("c")]);

        assert_eq!(registry.current_version(), 3);
        assert_eq!(registry.applicable(0).len(), 3);
        assert_eq!(registry.applicable(2).len(), 1);
        assert_eq!(registry.applicable(3).len(), 0);
        assert_eq!(registry.applicable(9).len(), 0);
    }

    #[test]
    fn empty_registry_is_version_zero() {
        assert_eq!(MigrationRegistry::empty().current_version(), 0);
    }
}
