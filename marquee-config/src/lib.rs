//! Configuration for Marquee services.
//!
//! Values are layered: an optional `.env` file, an optional TOML file
//! (`MARQUEE_CONFIG` or [`ConfigLoader::with_config_path`]), then process
//! environment variables, which win. Guard rails run on the composed result
//! and either reject it or attach [`ConfigWarnings`].
//!
//! [`pool::open_pool`] turns a [`DatabaseConfig`] into a bounded PostgreSQL
//! pool owned by the caller, and [`telemetry::init_tracing`] installs the
//! `tracing` subscriber.

#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod pool;
pub mod telemetry;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{AuthConfig, Config, ConfigMetadata, DatabaseConfig};
pub use pool::{connect_store, open_pool};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
