use pagecraft_core::{
    error::{MigrationAssertionError, StructuralError},
    walk::WalkError,
};
use thiserror::Error as ThisError;

///
/// MigrateError
///
/// Failure of a whole `migrate()` call. There is never a partial result:
/// the caller either receives a fully current-version document or one of
/// these, with its input untouched.
///

#[remain::sorted]
#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
pub enum MigrateError {
    #[error(transparent)]
    Assertion(#[from] MigrationAssertionError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// The stored version exceeds the registry length: the document was
    /// saved by a newer engine. Never truncated or guessed at.
    #[error("document version {found} exceeds the registry's current version {current}")]
    VersionSkew { found: u32, current: u32 },
}

impl From<WalkError> for MigrateError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::Structural(err) => Self::Structural(err),
            WalkError::Assertion(err) => Self::Assertion(err),
        }
    }
}
