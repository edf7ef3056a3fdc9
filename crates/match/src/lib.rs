pub mod catalog;
pub mod match_engine;
pub(crate) mod util;

pub use catalog::{load_catalog, load_csv, load_or_empty, load_workbook, CatalogError};
pub use match_engine::{CatalogMatch, CatalogMatcher, Reconciler};

/// Comparison-key helpers shared with callers that want to score text directly.
pub mod similarity {
    pub use crate::util::{bigram_similarity, normalize_key};
}
