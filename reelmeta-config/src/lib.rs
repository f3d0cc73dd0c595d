//! Configuration loading for reelmeta.
//!
//! Loads a [`Config`] from defaults, a TOML/JSON file or inline text, and
//! environment overrides; installs the tracing subscriber; and wires a
//! [`reelmeta_core::MediaIdentifier`] from the result.

#![allow(missing_docs)]

pub mod loader;
pub mod logging;
pub mod models;
pub mod util;
mod wiring;

pub use loader::{ConfigLoader, EnvConfig};
pub use logging::init_tracing;
pub use models::{Config, ConfigLoad, ConfigSource, LoggingConfig};
