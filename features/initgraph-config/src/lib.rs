//! initgraph config provides a registry of configs that can be injected in the
//! providers of an initgraph container.
//!
//! initgraph config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs and install it into a container
//! 2. Config<T>: A wrapper type under which configs are provided to constructors
//!
//! # Examples
//!
//! ```rust
//! #[derive(Clone)]
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//!     app_name: String,
//! }
//!
//! use initgraph_config::provider::ConfigProvider;
//!
//! let app_config = AppConfig {
//!     host: "localhost".to_string(),
//!     port: 8080_u16,
//!     app_name: "My Awesome App".to_string(),
//! };
//!
//! let mut config_provider = ConfigProvider::default();
//! config_provider.add_config(app_config.clone())?;
//!
//! let retrieved_config = config_provider
//!     .get_config::<AppConfig>()?
//!     .expect("config was added");
//!
//! assert_eq!(app_config.host, retrieved_config.host);
//! assert_eq!(app_config.port, retrieved_config.port);
//! assert_eq!(app_config.app_name, retrieved_config.app_name);
//! # Ok::<(), initgraph_config::errors::ConfigError>(())
//! ```
//!
//! initgraph config consists of the following components:
//!
//! 1. Config - the injected wrapper of a config value
//! 2. Provider - for creating a registry of configs, adding, retrieving and installing configs
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;
