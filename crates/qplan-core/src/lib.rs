//! QPlan Core
//!
//! Engine identity, per-engine dialect metadata, the reserved-word alias
//! rewrite applied before EXPLAIN, and normalizer configuration.

pub mod config;
pub mod dialect;
mod engine;
mod error;
pub mod rewrite;


pub use config::NormalizerConfig;
pub use dialect::{EngineDialect, ExplainConfig};
pub use engine::Engine;
pub use error::{QplanError, Result};
pub use rewrite::{AliasRewriter, quote_reserved_aliases};
