//! Product/variant matching between two catalogs.
//!
//! Pure functions over in-memory snapshots: no I/O, no shared state. The
//! pipeline is [`KeyBuilder`] (normalized names and canonical sizes) →
//! [`build_index`] over the target catalog → [`match_item`] per source item.

pub mod error;
pub mod index;
pub mod keys;
pub mod matcher;
pub mod normalize;
pub mod size;
pub mod snapshot;

pub use error::MatchingError;
pub use index::{build_index, CatalogIndex};
pub use keys::KeyBuilder;
pub use matcher::{match_all, match_item, MatchMethod, MatchResult};
pub use normalize::{base_name, normalize_name};
pub use size::SizeExtractor;
pub use snapshot::CatalogSnapshot;
