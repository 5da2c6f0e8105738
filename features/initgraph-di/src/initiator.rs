use std::sync::OnceLock;

use crate::{
    errors::BuildError,
    graph::Graph,
    registry::{ProviderId, Registry},
    types::Instance,
};

/// Runs the providers of a resolved graph in build order
///
/// Each provider receives the built values of its dependencies, which the order
/// guarantees to be present, and fills its own slot.
pub(crate) struct DiInitiator<'a> {
    registry: &'a mut Registry,
    graph: &'a Graph<ProviderId>,
    /// Built values, indexed by provider
    slots: &'a [OnceLock<Instance>],
}

impl<'a> DiInitiator<'a> {
    pub(crate) fn new(
        registry: &'a mut Registry,
        graph: &'a Graph<ProviderId>,
        slots: &'a [OnceLock<Instance>],
    ) -> Self {
        DiInitiator {
            registry,
            graph,
            slots,
        }
    }

    /// Builds every provider, stopping at the first failure
    pub(crate) fn initiate(self) -> Result<(), BuildError> {
        let provider_count = self.graph.len();
        tracing::debug!("Building {provider_count} providers");

        for (built, (node, &id)) in self.graph.iter().enumerate() {
            let product = self.registry.get(id).key;

            // Collect the arguments in declared order, edges follow the arguments
            let mut arguments = Vec::with_capacity(self.graph.edges(node).len());
            for dependency in self.graph.edges(node) {
                let dependency = *self.graph.value(*dependency);
                match self.slots[dependency.index()].get() {
                    Some(instance) => arguments.push(instance.clone()),
                    None => {
                        return Err(BuildError::DependencyNotBuilt {
                            product,
                            dependency: self.registry.get(dependency).key,
                        })
                    }
                }
            }

            let Some(constructor) = self.registry.get_mut(id).descriptor.constructor.take() else {
                return Err(BuildError::AlreadyBuilt);
            };

            let instance = constructor(arguments).map_err(|error| {
                tracing::error!("Provider for {product} failed: {error}");
                BuildError::ProviderFailed { product, error }
            })?;

            if instance.key != product {
                return Err(BuildError::UnexpectedOutput {
                    expected: product,
                    actual: instance.key,
                });
            }

            if self.slots[id.index()].set(instance).is_err() {
                return Err(BuildError::AlreadyBuilt);
            }

            tracing::debug!(
                "Constructed instance of {product} [{} of {provider_count} complete]",
                built + 1
            );
        }

        Ok(())
    }
}
