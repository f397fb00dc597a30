//! Core domain models and shared infrastructure.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ConfigBuilder};
pub use error::{Result, VitalsError};
pub use types::{DeviceClass, MetricEvent, MetricName};
