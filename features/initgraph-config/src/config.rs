use std::{fmt::Debug, ops::Deref, sync::Arc};

/// A wrapper type to allow for config injections
///
/// [`ConfigProvider::install`](crate::provider::ConfigProvider::install) registers one
/// `Config<T>` per added config, so constructors receive it like any other dependency.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
///
/// use initgraph_config::{config::Config, provider::ConfigProvider};
/// use initgraph_di::Container;
///
/// struct ServerConfig {
///     port: u16,
/// }
///
/// struct Server {
///     port: u16,
/// }
///
/// let mut configs = ConfigProvider::new();
/// configs.add_config(ServerConfig { port: 8080 })?;
///
/// let mut container = Container::new();
/// configs.install(&mut container)?;
/// container.register(|config: Arc<Config<ServerConfig>>| Server { port: config.port })?;
/// container.initialize()?;
///
/// assert_eq!(container.get::<Server>()?.port, 8080);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Config {
            inner: self.inner.clone(),
        }
    }
}
impl<T: Debug> Debug for Config<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Config").field(&self.inner).finish()
    }
}
impl<T> Config<T> {
    pub(crate) fn new(inner: Arc<T>) -> Self {
        Config { inner }
    }

    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}
