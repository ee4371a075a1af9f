//! Reporting utilities for a knowledge-graph-embedding pipeline.
//!
//! Two independent pipelines live here:
//! - [`training_log`] + [`report`]: parse a training log and draw its loss
//!   curves to `<log>.png`.
//! - [`prediction`] + [`sparql`]: filter link predictions by ontology
//!   membership and replace IRIs with labels from a SPARQL endpoint.

/// Application directory resolution.
pub mod app_dirs;
/// Persistent settings.
pub mod config;
/// Global tracing setup.
pub mod logging;
pub mod prediction;
pub mod report;
pub mod sparql;
pub mod training_log;
