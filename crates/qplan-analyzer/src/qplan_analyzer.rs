//! QPlan Analyzer - EXPLAIN normalization and plan queries
//!
//! This crate provides functionality for:
//! - Normalizing EXPLAIN output from DuckDB, MySQL, and PostgreSQL into one
//!   canonical plan tree
//! - Classifying engine operator names into canonical operators
//! - Pruning plans to their scan/join skeleton and summarizing plan corpora

pub mod explain;
pub mod workload;

pub use explain::*;
pub use workload::*;
