use std::{any::TypeId, collections::HashMap};

use crate::{
    errors::{RegisterError, ShapeError},
    provider::{Output, ProviderDescriptor, ProviderSignature},
    types::TypeKey,
};

/// Position of a provider in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ProviderId(usize);

pub(crate) struct Registration {
    pub key: TypeKey,
    pub descriptor: ProviderDescriptor,
}

/// Providers by the type they provide, in registration order
#[derive(Default)]
pub(crate) struct Registry {
    registrations: Vec<Registration>,
    index: HashMap<TypeId, ProviderId>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            registrations: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Stores a descriptor for `key`
    ///
    /// Fails if `key` already has a provider, or if the descriptor or its closer is
    /// for another type.
    pub fn insert(
        &mut self,
        key: TypeKey,
        descriptor: ProviderDescriptor,
    ) -> Result<ProviderId, RegisterError> {
        if self.index.contains_key(&key.type_id) {
            return Err(RegisterError::Duplicate(key));
        }
        validate(key, &descriptor.signature)?;
        if let Some(closer) = &descriptor.closer {
            if closer.key != key {
                return Err(RegisterError::TypeMismatch {
                    expected: key,
                    actual: closer.key,
                });
            }
        }

        let id = ProviderId(self.registrations.len());
        self.registrations.push(Registration { key, descriptor });
        self.index.insert(key.type_id, id);

        tracing::debug!("Registered provider for {key}");
        Ok(id)
    }

    pub fn find(&self, key: &TypeKey) -> Option<ProviderId> {
        self.index.get(&key.type_id).copied()
    }

    pub fn get(&self, id: ProviderId) -> &Registration {
        &self.registrations[id.0]
    }

    pub fn get_mut(&mut self, id: ProviderId) -> &mut Registration {
        &mut self.registrations[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &Registration)> + '_ {
        self.registrations
            .iter()
            .enumerate()
            .map(|(index, registration)| (ProviderId(index), registration))
    }
}

impl ProviderId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Checks that a signature returns `key`, optionally followed by a failure
fn validate(key: TypeKey, signature: &ProviderSignature) -> Result<(), RegisterError> {
    let invalid = |reason| RegisterError::InvalidShape {
        product: key,
        reason,
    };

    let provided = match signature.outputs.as_slice() {
        [] => return Err(invalid(ShapeError::NoOutputs)),
        outputs if outputs.len() > 2 => {
            return Err(invalid(ShapeError::TooManyOutputs(outputs.len())))
        }
        [Output::Failure(_), ..] => return Err(invalid(ShapeError::FailureFirst)),
        [Output::Value(provided)] | [Output::Value(provided), Output::Failure(_)] => *provided,
        [_, Output::Value(second), ..] => {
            return Err(invalid(ShapeError::SecondNotFailure(*second)))
        }
        outputs => return Err(invalid(ShapeError::TooManyOutputs(outputs.len()))),
    };

    if provided != key {
        return Err(RegisterError::TypeMismatch {
            expected: key,
            actual: provided,
        });
    }

    Ok(())
}
