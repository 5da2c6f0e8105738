use initgraph_di::{RegisterError, TypeKey};

/// Errors of the [`ConfigProvider`](crate::provider::ConfigProvider)
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The required config is not known
    #[error("The required Config type '{0}' is not known")]
    ConfigMissing(TypeKey),
    /// A config of this type was already added
    #[error("The Config type '{0}' is already registered")]
    ConfigAlreadyRegistered(TypeKey),
    /// The container refused the config provider
    #[error(transparent)]
    Register(#[from] RegisterError),
}
