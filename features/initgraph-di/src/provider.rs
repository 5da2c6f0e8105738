use std::{any::type_name, sync::Arc};

use crate::{
    errors::RequireError,
    teardown::{Closer, DynCloser},
    types::{DynError, Injectable, Instance, TypeKey},
};

/// One declared output of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// The provided value
    Value(TypeKey),
    /// A failure signal, only valid as the second output
    ///
    /// Typed constructors only produce this for an `E: Into<DynError>`. For hand
    /// written signatures any key is accepted, the key is only descriptive since the
    /// erased constructor reports failures as [`DynError`] anyway.
    Failure(TypeKey),
}

/// Declared inputs and outputs of a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSignature {
    /// Argument types, in call order
    pub arguments: Vec<TypeKey>,
    pub outputs: Vec<Output>,
}
impl ProviderSignature {
    pub fn return_arity(&self) -> usize {
        self.outputs.len()
    }

    /// True if the provider may return a failure
    pub fn is_fallible(&self) -> bool {
        matches!(self.outputs.get(1), Some(Output::Failure(_)))
    }
}

pub(crate) type BoxedConstructor =
    Box<dyn FnOnce(Vec<Instance>) -> Result<Instance, DynError> + Send>;

/// Exposes the teardown capability of a built value
pub(crate) type CloserFn = fn(&Instance) -> Option<Arc<dyn DynCloser>>;

/// Teardown capability of a descriptor, for values of type `key`
#[derive(Clone, Copy)]
pub(crate) struct CloserSlot {
    pub key: TypeKey,
    pub close: CloserFn,
}

/// Type erased provider: signature, constructor and optional teardown capability
pub struct ProviderDescriptor {
    pub(crate) signature: ProviderSignature,
    /// Taken when the provider runs, so it is called at most once
    pub(crate) constructor: Option<BoxedConstructor>,
    pub(crate) closer: Option<CloserSlot>,
}
impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("signature", &self.signature)
            .field("consumed", &self.constructor.is_none())
            .field("closeable", &self.closer.is_some())
            .finish()
    }
}

impl ProviderDescriptor {
    /// Creates a descriptor from a hand written signature
    ///
    /// The constructor receives one instance per declared argument, in order. Nothing
    /// is checked here; registering the descriptor validates the signature.
    pub fn new<F>(signature: ProviderSignature, constructor: F) -> Self
    where
        F: FnOnce(Vec<Instance>) -> Result<Instance, DynError> + Send + 'static,
    {
        ProviderDescriptor {
            signature,
            constructor: Some(Box::new(constructor)),
            closer: None,
        }
    }

    /// Creates a descriptor from a typed constructor
    pub fn from_constructor<T, Marker, C>(constructor: C) -> Self
    where
        T: Injectable,
        C: Constructor<T, Marker>,
    {
        ProviderDescriptor {
            signature: C::signature(),
            constructor: Some(Box::new(move |arguments| constructor.construct(arguments))),
            closer: None,
        }
    }

    /// Marks the built value as closeable
    ///
    /// `T` has to be the provided type, registering the descriptor fails otherwise.
    pub fn with_closer<T: Closer>(mut self) -> Self {
        self.closer = Some(CloserSlot {
            key: TypeKey::of::<T>(),
            close: closer_of::<T>,
        });
        self
    }

    pub fn signature(&self) -> &ProviderSignature {
        &self.signature
    }

    pub fn is_closeable(&self) -> bool {
        self.closer.is_some()
    }
}

fn closer_of<T: Closer>(instance: &Instance) -> Option<Arc<dyn DynCloser>> {
    let closer: Arc<dyn DynCloser> = instance.downcast::<T>().ok()?;
    Some(closer)
}

/// Marker for providers returning the value directly
pub struct Plain;
/// Marker for providers returning `Result<T, E>`
pub struct Fallible;

/// Return shape of a provider producing `T`
pub trait ProviderOutput<T, Shape> {
    fn outputs() -> Vec<Output>;

    fn into_result(self) -> Result<T, DynError>;
}
impl<T: Injectable> ProviderOutput<T, Plain> for T {
    fn outputs() -> Vec<Output> {
        vec![Output::Value(TypeKey::of::<T>())]
    }

    fn into_result(self) -> Result<T, DynError> {
        Ok(self)
    }
}
impl<T: Injectable, E: Into<DynError> + 'static> ProviderOutput<T, Fallible> for Result<T, E> {
    fn outputs() -> Vec<Output> {
        vec![
            Output::Value(TypeKey::of::<T>()),
            Output::Failure(TypeKey::of::<E>()),
        ]
    }

    fn into_result(self) -> Result<T, DynError> {
        self.map_err(Into::into)
    }
}

/// A function building `T` from `Arc`s of its dependencies
///
/// Implemented for every `FnOnce(Arc<A>, Arc<B>, ..) -> R` with up to eight
/// arguments, where `R` is either `T` or `Result<T, E>`. The `Marker` parameter only
/// exists to tell those implementations apart and is always inferred.
///
/// ```ignore
/// fn new_sentence(number: Arc<MyInt>, mult: Arc<MyMultiplier>) -> MySentence {
///     MySentence(format!("hello world {}", number.0 * mult.0))
/// }
///
/// container.register(new_sentence)?;
/// ```
pub trait Constructor<T, Marker>: Send + 'static {
    /// Signature derived from the function type
    fn signature() -> ProviderSignature;

    /// Calls the function with one instance per argument
    fn construct(self, arguments: Vec<Instance>) -> Result<Instance, DynError>;
}

fn next_argument<A: Injectable>(
    arguments: &mut impl Iterator<Item = Instance>,
) -> Result<Arc<A>, DynError> {
    let instance = arguments.next().ok_or(RequireError::TypeMissing(TypeKey::of::<A>()))?;
    instance.downcast().map_err(|actual_type| {
        RequireError::DowncastFailed {
            required_type: type_name::<A>(),
            actual_type,
        }
        .into()
    })
}

macro_rules! impl_constructor {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<T, R, Shape, F, $($arg,)*> Constructor<T, (Shape, $($arg,)*)> for F
        where
            T: Injectable,
            R: ProviderOutput<T, Shape>,
            F: FnOnce($(Arc<$arg>),*) -> R + Send + 'static,
            $($arg: Injectable,)*
        {
            fn signature() -> ProviderSignature {
                ProviderSignature {
                    arguments: vec![$(TypeKey::of::<$arg>()),*],
                    outputs: <R as ProviderOutput<T, Shape>>::outputs(),
                }
            }

            fn construct(self, arguments: Vec<Instance>) -> Result<Instance, DynError> {
                let mut arguments = arguments.into_iter();
                $(let $arg = next_argument::<$arg>(&mut arguments)?;)*
                let value = (self)($($arg),*).into_result()?;
                Ok(Instance::new(value))
            }
        }
    };
}

impl_constructor!();
impl_constructor!(A1);
impl_constructor!(A1, A2);
impl_constructor!(A1, A2, A3);
impl_constructor!(A1, A2, A3, A4);
impl_constructor!(A1, A2, A3, A4, A5);
impl_constructor!(A1, A2, A3, A4, A5, A6);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8);
