//! initgraph wires provider functions into an initialization order, builds them and
//! tears them down again.
//!
//! A provider is a function producing one value from `Arc`s of other provided values.
//! The [`Container`] infers the dependency graph from the providers' argument types,
//! rejects missing dependencies and cycles, runs the providers dependency first and
//! finally closes every value implementing [`Closer`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use initgraph_di::Container;
//!
//! struct MyInt(i64);
//! struct MyMultiplier(i64);
//! struct MySentence(String);
//!
//! fn new_sentence(number: Arc<MyInt>, mult: Arc<MyMultiplier>) -> MySentence {
//!     MySentence(format!("hello world {}", number.0 * mult.0))
//! }
//!
//! let mut container = Container::new();
//! container
//!     .register(new_sentence)?
//!     .register(|| MyInt(21))?
//!     .register(|| MyMultiplier(2))?;
//!
//! container.initialize()?;
//!
//! let sentence = container.get::<MySentence>()?;
//! assert_eq!(sentence.0, "hello world 42");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The crate consists of the following components:
//!
//! 1. Graph - ordering nodes dependency first, detecting cycles
//! 2. Registry and Provider - typed and type erased provider descriptions
//! 3. Container - resolving, building, lookup and teardown
//! 4. Plan - a printable view of the build order

pub mod config;
pub mod container;
pub mod errors;
pub mod graph;
mod initiator;
pub mod plan;
pub mod provider;
mod registry;
pub mod teardown;
pub mod types;

pub use config::{ContainerConfig, TeardownOrder};
pub use container::{Container, ProviderNode};
pub use errors::{
    BuildError, InitError, NotResolved, RegisterError, RequireError, ResolveError, ShapeError,
    TeardownError,
};
pub use plan::{InitPlan, PlanStep};
pub use provider::{Constructor, Output, ProviderDescriptor, ProviderSignature};
pub use teardown::{Closer, Teardown};
pub use types::{DynError, Injectable, Instance, TypeKey};
