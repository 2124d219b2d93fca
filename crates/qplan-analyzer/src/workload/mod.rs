//! Plan Query Utilities
//!
//! Read-only operations over normalized plans and plan corpora:
//! - Scan/join skeleton extraction
//! - Corpus-level summaries (relations, operators, attributes, filters)

pub mod attributes;
pub mod info;
pub mod prune;

pub use attributes::filtered_attributes;
pub use info::{GENERIC_JOIN, GENERIC_SCAN, WorkloadInfo};
pub use prune::filter_scans_or_joins;
