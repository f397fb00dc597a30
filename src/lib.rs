//! Vitals - self-hosted real-user-monitoring collector.
//!
//! Vitals receives web-vitals beacons (LCP, CLS, INP, FCP, TTFB) from real
//! browser sessions, keeps them in a bounded, time-windowed in-memory buffer,
//! and serves count/p50/p75/p95 summaries grouped overall, by page path, and
//! by device class.
//!
//! # Features
//!
//! - **Public beacon endpoint**: batched JSON ingestion with per-event
//!   sanitization and probabilistic sampling
//! - **Bounded memory**: FIFO eviction at a fixed capacity plus a retention
//!   window, independent of traffic volume
//! - **Deterministic summaries**: nearest-rank percentiles, stable output
//!   shape (all metric names and device classes always present)
//! - **Zero configuration**: works out of the box with sensible defaults
//!
//! # Architecture
//!
//! - `ingest`: payload sanitization, device classification, sampling
//! - `store`: the bounded event buffer
//! - `summary`: pure aggregation over store snapshots
//! - `api`: HTTP boundary (axum)
//! - `core`: domain models, configuration, errors
//!
//! # Example
//!
//! ```no_run
//! use vitals_lib::core::Config;
//! use vitals_lib::Application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let app = Application::new(config)?;
//!     app.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod application;
pub mod cli;
pub mod core;
pub mod ingest;
pub mod store;
pub mod summary;

// Re-export core types for convenience
pub use crate::application::Application;
pub use crate::core::{Config, Result};
