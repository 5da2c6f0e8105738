use thiserror::Error;

use crate::types::{DynError, TypeKey};

/// Errors while registering a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// The type already has a provider, the first one is kept
    #[error("A Type has been registered twice: '{0}'")]
    Duplicate(TypeKey),
    #[error("Provider for '{product}' has an invalid shape: {reason}")]
    InvalidShape { product: TypeKey, reason: ShapeError },
    #[error("Provider registered for '{expected}' provides '{actual}'")]
    TypeMismatch { expected: TypeKey, actual: TypeKey },
    /// Providers can only be registered before the container is resolved
    #[error("Cannot register '{0}', the container is already resolved")]
    Frozen(TypeKey),
}

/// Why a provider signature was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("it must return at least one value")]
    NoOutputs,
    #[error("it must not return more than two values, got {0}")]
    TooManyOutputs(usize),
    #[error("its first output must be the provided value")]
    FailureFirst,
    #[error("its second output must be a failure, got '{0}'")]
    SecondNotFailure(TypeKey),
}

/// Errors while resolving the dependency graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: TypeKey,
        required_by: TypeKey,
    },
    /// `chain` starts and ends with `on`
    #[error("A Circular Dependency exists on '{on}' through {}", display_chain(.chain))]
    CircularDependency { on: TypeKey, chain: Vec<TypeKey> },
    /// Internal invariant violation of the sort
    #[error("The dependency graph is invalid, '{0}' could not be resolved")]
    InvalidGraph(TypeKey),
    #[error("The container is already resolved")]
    AlreadyResolved,
}

fn display_chain(chain: &[TypeKey]) -> String {
    chain
        .iter()
        .map(|key| key.type_name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// The container has not been resolved yet
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("The container has not been resolved yet")]
pub struct NotResolved;

/// Errors while building the resolved providers
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    NotResolved(#[from] NotResolved),
    #[error("The container was already built")]
    AlreadyBuilt,
    /// A provider returned a failure, the build was aborted
    #[error("Provider for '{product}' failed - error: {error}")]
    ProviderFailed {
        product: TypeKey,
        #[source]
        error: DynError,
    },
    /// A type erased provider returned a value of another type
    #[error("Provider for '{expected}' returned a '{actual}'")]
    UnexpectedOutput { expected: TypeKey, actual: TypeKey },
    #[error("'{dependency}' was not built before '{product}'")]
    DependencyNotBuilt {
        product: TypeKey,
        dependency: TypeKey,
    },
}

/// Errors of [`Container::initialize`](crate::Container::initialize)
#[derive(Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Errors when trying to get a built value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequireError {
    /// The required type is not known
    #[error("The required type '{0}' is not known.")]
    TypeMissing(TypeKey),
    /// The required type is known, but the container was not built
    #[error("The required type '{0}' has not been built.")]
    NotBuilt(TypeKey),
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// A closer failed while tearing down the container
#[derive(Error, Debug)]
#[error("Closing '{product}' failed - error: {error}")]
pub struct TeardownError {
    pub product: TypeKey,
    #[source]
    pub error: DynError,
}
