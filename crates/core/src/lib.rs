pub mod catalog;
pub mod config;
pub mod item;
pub mod report;

pub use catalog::{Catalog, CatalogColumns, CatalogRow, Sheet};
pub use config::{ConfigError, MatchScope, NoiseFilter, ReconcileConfig};
pub use item::{ParsedItem, PartLine, INSUFFICIENT_TOKENS};
pub use report::{
    format_match_rate, MatchedItem, ReconcileReport, UnmatchedItem, UnmatchedReason,
    NOT_AVAILABLE, NO_PART_NUMBER,
};
