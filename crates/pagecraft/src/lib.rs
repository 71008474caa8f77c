//! Pagecraft: a versioned, ordered set of pure tree transforms applied
//! deterministically to page-builder documents. The entry point is
//! [`migrate`]; units are authored against the core walker and edit
//! primitives re-exported here.

pub mod error;
pub mod registry;
pub mod runner;
pub mod unit;

// re-exports
pub use error::MigrateError;
pub use pagecraft_core as core;
pub use registry::MigrationRegistry;
pub use runner::migrate;
pub use unit::{MigrationContext, MigrationUnit, NodeUnit};

///
/// Prelude
///
/// Domain vocabulary for authoring and running migrations.
///

pub mod prelude {
    pub use crate::{
        error::MigrateError,
        registry::MigrationRegistry,
        runner::migrate,
        unit::{MigrationContext, MigrationUnit, NodeUnit},
    };
    pub use pagecraft_core::{
        prelude::*,
        walk::{CollectionKind, PathSegment, Splice, VisitAction},
    };
}
