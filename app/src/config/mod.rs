//! Configuration: validation and loading from the environment.

pub mod app_config;
pub mod validation;

pub use app_config::{AppConfig, ConfigError};
