use std::{
    fmt::Debug,
    sync::{Arc, OnceLock},
};

use crate::{
    config::ContainerConfig,
    errors::{
        BuildError, InitError, NotResolved, RegisterError, RequireError, ResolveError,
        TeardownError,
    },
    graph::{Graph, GraphError, NodeId},
    initiator::DiInitiator,
    provider::{Constructor, ProviderDescriptor, ProviderSignature},
    registry::{ProviderId, Registry},
    teardown::{Closeable, Closer, Teardown},
    types::{Injectable, Instance, TypeKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Registering,
    Resolved,
    Built,
    /// A provider failed, built values are only kept for teardown
    Failed,
}

/// Container wiring providers into a build order and holding what they built
///
/// A container goes through four steps:
/// 1. Register providers with [`Container::register`] and friends
/// 2. [`Container::resolve`] the dependency graph into a build order
/// 3. [`Container::build`] every provider in that order
/// 4. [`Container::get`] built values, and finally [`Container::close`] the container
pub struct Container {
    config: ContainerConfig,
    registry: Registry,
    /// One node per provider, filled by resolve
    graph: Graph<ProviderId>,
    /// Built values, indexed by provider
    slots: Vec<OnceLock<Instance>>,
    phase: Phase,
}
impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Container");
        for (id, registration) in self.registry.iter() {
            let state = match self.slots.get(id.index()).and_then(OnceLock::get) {
                Some(_) => "built",
                None => "pending",
            };
            map.field(registration.key.type_name, &state);
        }
        map.finish()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Container {
            config,
            registry: Registry::new(),
            graph: Graph::new(),
            slots: Vec::new(),
            phase: Phase::Registering,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Registers a constructor providing `T`
    ///
    /// The constructor's arguments are the dependencies of `T`. Fallible constructors
    /// return `Result<T, E>`, in which case `T` usually has to be named:
    /// `container.register::<Greeter, _>(new_greeter)`.
    pub fn register<T: Injectable, Marker>(
        &mut self,
        constructor: impl Constructor<T, Marker>,
    ) -> Result<&mut Self, RegisterError> {
        self.register_descriptor(
            TypeKey::of::<T>(),
            ProviderDescriptor::from_constructor(constructor),
        )
    }

    /// Registers a constructor providing `T`, which is closed on [`Container::close`]
    pub fn register_closeable<T: Closer, Marker>(
        &mut self,
        constructor: impl Constructor<T, Marker>,
    ) -> Result<&mut Self, RegisterError> {
        self.register_descriptor(
            TypeKey::of::<T>(),
            ProviderDescriptor::from_constructor(constructor).with_closer::<T>(),
        )
    }

    /// Registers an already created value
    pub fn register_instance<T: Injectable>(&mut self, instance: T) -> Result<&mut Self, RegisterError> {
        self.register::<T, _>(move || instance)
    }

    /// Registers a type erased provider for `key`
    ///
    /// The descriptor's signature is checked against `key`.
    pub fn register_descriptor(
        &mut self,
        key: TypeKey,
        descriptor: ProviderDescriptor,
    ) -> Result<&mut Self, RegisterError> {
        if self.phase != Phase::Registering {
            return Err(RegisterError::Frozen(key));
        }
        self.registry.insert(key, descriptor)?;
        Ok(self)
    }

    /// Builds the dependency graph and sorts it into build order
    ///
    /// A failed resolve keeps the registrations, so missing providers can still be added.
    pub fn resolve(&mut self) -> Result<(), ResolveError> {
        if self.phase != Phase::Registering {
            return Err(ResolveError::AlreadyResolved);
        }

        let mut graph = Graph::with_capacity(self.registry.len());
        let nodes: Vec<NodeId> = self
            .registry
            .iter()
            .map(|(id, _)| graph.add_node(id))
            .collect();

        for (id, registration) in self.registry.iter() {
            for argument in &registration.descriptor.signature.arguments {
                let Some(dependency) = self.registry.find(argument) else {
                    tracing::error!("{} needs {argument} but it is missing", registration.key);
                    return Err(ResolveError::MissingDependency {
                        dependency: *argument,
                        required_by: registration.key,
                    });
                };
                graph.add_edge(nodes[id.index()], nodes[dependency.index()]);
            }
        }

        if let Err(error) = graph.resolve() {
            return Err(self.resolve_error(&graph, error));
        }

        tracing::debug!(
            "Resolved build order: [{}]",
            graph
                .iter()
                .map(|(_, id)| self.registry.get(*id).key.type_name)
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.slots = (0..self.registry.len()).map(|_| OnceLock::new()).collect();
        self.graph = graph;
        self.phase = Phase::Resolved;
        Ok(())
    }

    fn resolve_error(&self, graph: &Graph<ProviderId>, error: GraphError) -> ResolveError {
        let key_of = |node: NodeId| self.registry.get(*graph.value(node)).key;
        match error {
            GraphError::Cycle { node, chain } => ResolveError::CircularDependency {
                on: key_of(node),
                chain: chain.into_iter().map(key_of).collect(),
            },
            GraphError::Stalled { node } => ResolveError::InvalidGraph(key_of(node)),
        }
    }

    /// Runs every provider in build order
    ///
    /// Stops at the first failing provider. Values built up to that point are only
    /// kept for [`Container::close`]; the container can not be built again.
    pub fn build(&mut self) -> Result<(), BuildError> {
        match self.phase {
            Phase::Registering => return Err(NotResolved.into()),
            Phase::Built | Phase::Failed => return Err(BuildError::AlreadyBuilt),
            Phase::Resolved => {}
        }

        let result = DiInitiator::new(&mut self.registry, &self.graph, &self.slots).initiate();
        self.phase = match result {
            Ok(()) => Phase::Built,
            Err(_) => Phase::Failed,
        };
        result
    }

    /// Resolves and builds the container
    pub fn initialize(&mut self) -> Result<(), InitError> {
        self.resolve()?;
        self.build()?;
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.phase != Phase::Registering
    }

    pub fn is_built(&self) -> bool {
        self.phase == Phase::Built
    }

    /// Returns the built value of `T`
    pub fn get<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        let key = TypeKey::of::<T>();
        let Some(id) = self.registry.find(&key) else {
            tracing::error!("Tried to get an unregistered type: {key}");
            return Err(RequireError::TypeMissing(key));
        };

        if self.phase != Phase::Built {
            return Err(RequireError::NotBuilt(key));
        }

        let instance = self
            .slots
            .get(id.index())
            .and_then(OnceLock::get)
            .ok_or(RequireError::NotBuilt(key))?;

        instance
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: key.type_name,
                actual_type,
            })
    }

    /// Visits every provider in build order until `visit` returns false
    pub fn range(&self, mut visit: impl FnMut(ProviderNode<'_>) -> bool) -> Result<(), NotResolved> {
        if self.phase == Phase::Registering {
            return Err(NotResolved);
        }

        for (_, id) in self.graph.iter() {
            let registration = self.registry.get(*id);
            let node = ProviderNode {
                key: registration.key,
                signature: &registration.descriptor.signature,
                closeable: registration.descriptor.is_closeable(),
            };
            if !visit(node) {
                break;
            }
        }

        Ok(())
    }

    /// Provided types in build order
    pub fn build_order(&self) -> Result<Vec<TypeKey>, NotResolved> {
        let mut order = Vec::with_capacity(self.registry.len());
        self.range(|node| {
            order.push(node.key());
            true
        })?;
        Ok(order)
    }

    /// Tears down every built value registered as closeable
    ///
    /// The returned stream yields one error per failing closer and ends once all
    /// closers completed. See [`TeardownOrder`](crate::TeardownOrder) for the order.
    pub fn close(self) -> Teardown {
        let order: Vec<(NodeId, ProviderId)> =
            self.graph.iter().map(|(node, id)| (node, *id)).collect();

        // Dependents come after their dependencies, walking backwards sees them first
        let mut depths = vec![0usize; self.registry.len()];
        for (node, id) in order.iter().rev() {
            let depth = depths[id.index()];
            for dependency in self.graph.edges(*node) {
                let dependency = self.graph.value(*dependency).index();
                depths[dependency] = depths[dependency].max(depth + 1);
            }
        }

        let mut closeables = Vec::new();
        let mut failures = Vec::new();
        for (_, id) in order {
            let registration = self.registry.get(id);
            let Some(slot) = registration.descriptor.closer else {
                continue;
            };
            let Some(instance) = self.slots.get(id.index()).and_then(OnceLock::get) else {
                continue;
            };
            match (slot.close)(instance) {
                Some(closer) => closeables.push(Closeable {
                    product: registration.key,
                    closer,
                    depth: depths[id.index()],
                }),
                None => {
                    tracing::warn!(
                        "Cannot close {}, the built value is a {} and not a {}",
                        registration.key,
                        instance.key,
                        slot.key
                    );
                    failures.push(TeardownError {
                        product: registration.key,
                        error: format!("built value is not a '{}'", slot.key).into(),
                    });
                }
            }
        }

        Teardown::new(closeables, failures, self.config.teardown_order)
    }
}

/// A provider as seen by [`Container::range`]
#[derive(Debug, Clone, Copy)]
pub struct ProviderNode<'a> {
    key: TypeKey,
    signature: &'a ProviderSignature,
    closeable: bool,
}
impl ProviderNode<'_> {
    /// The provided type
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Types the provider depends on, in argument order
    pub fn dependencies(&self) -> &[TypeKey] {
        &self.signature.arguments
    }

    pub fn return_arity(&self) -> usize {
        self.signature.return_arity()
    }

    pub fn is_fallible(&self) -> bool {
        self.signature.is_fallible()
    }

    pub fn is_closeable(&self) -> bool {
        self.closeable
    }
}
