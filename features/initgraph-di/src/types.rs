//! Keys and values shared by every part of the container.

use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

/// Failure of a provider or closer, erased to a trait object
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Bound of every provided value
///
/// Values are handed out as `Arc`s to any number of dependents and closed from
/// whichever thread polls the teardown.
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Identity of a provided type
///
/// Equality and hashing only look at the `TypeId`, the name is kept for messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}
impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}
impl Eq for TypeKey {}
impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}
impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A value built by a provider, tagged with the key of its concrete type
#[derive(Clone)]
pub struct Instance {
    pub key: TypeKey,
    pub value: Arc<dyn Any + Send + Sync>,
}
impl Instance {
    pub fn new<T: Injectable>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Injectable>(value: Arc<T>) -> Self {
        let key = TypeKey::of::<T>();
        Instance { key, value }
    }

    /// Shares the value as `T`
    ///
    /// On mismatch the error is the name of the type actually held.
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        Arc::clone(&self.value)
            .downcast::<T>()
            .map_err(|_| self.key.type_name)
    }
}
impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>", self.key)
    }
}
