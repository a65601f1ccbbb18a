//! Canonical data model for repository collections
//!
//! Input files arrive in several historical schema shapes (`schema_version`
//! 1 through 3). Everything past the load boundary operates on the one
//! canonical [`RepoRecord`] shape produced by [`RepoCollection::load`]; no
//! code deeper in the pipeline branches on schema version.

mod category;
mod collection;
mod record;

pub use category::{Category, categorize};
pub use collection::RepoCollection;
pub use record::RepoRecord;
