use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use initgraph_di::{Container, Injectable, TypeKey};

use crate::{config::Config, errors::ConfigError};

type ConfigValue = Arc<dyn Any + Send + Sync + 'static>;

struct ConfigEntry {
    key: TypeKey,
    value: ConfigValue,
    /// Registers the value as `Config<T>` for the type it was added with
    install: fn(TypeKey, &ConfigValue, &mut Container) -> Result<(), ConfigError>,
}

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type, and are installed into a
/// [`Container`] as `Config<T>` providers.
#[derive(Default)]
pub struct ConfigProvider {
    /// Configs in the order they were added
    configs: Vec<ConfigEntry>,
    index: HashMap<TypeId, usize>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Retrieve a config with specified type.
    ///
    /// Returns `Ok(None)` if no config of that type was added.
    pub fn get_config<T: Injectable>(&self) -> Result<Option<Arc<T>>, ConfigError> {
        let Some(&position) = self.index.get(&TypeId::of::<T>()) else {
            return Ok(None);
        };

        self.configs[position]
            .value
            .clone()
            .downcast()
            .map(Some)
            .map_err(|_| ConfigError::ConfigMissing(TypeKey::of::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a
    /// [`ConfigError`] runtime error
    pub fn add_config<T: Injectable>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let key = TypeKey::of::<T>();

        if self.index.contains_key(&key.type_id) {
            return Err(ConfigError::ConfigAlreadyRegistered(key));
        }

        self.index.insert(key.type_id, self.configs.len());
        self.configs.push(ConfigEntry {
            key,
            value: Arc::new(config),
            install: install_config::<T>,
        });
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Injectable>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Registers every config as a `Config<T>` instance of `container`
    ///
    /// Configs are registered in the order they were added. Stops at the first config
    /// the container refuses, e.g. because it is already resolved.
    pub fn install(&self, container: &mut Container) -> Result<(), ConfigError> {
        for entry in &self.configs {
            (entry.install)(entry.key, &entry.value, container)?;
        }
        tracing::debug!("Installed {} configs", self.configs.len());
        Ok(())
    }
}

fn install_config<T: Injectable>(
    key: TypeKey,
    value: &ConfigValue,
    container: &mut Container,
) -> Result<(), ConfigError> {
    let inner = value
        .clone()
        .downcast::<T>()
        .map_err(|_| ConfigError::ConfigMissing(key))?;
    container.register_instance(Config::new(inner))?;
    tracing::debug!("Installed config {key}");
    Ok(())
}
