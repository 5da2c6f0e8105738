//! Human readable view of a resolved container.

use std::fmt::Display;

use crate::{container::Container, errors::NotResolved, types::TypeKey};

/// One provider call of an [`InitPlan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub product: TypeKey,
    pub dependencies: Vec<TypeKey>,
    pub fallible: bool,
}

/// The provider calls a build will perform, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitPlan {
    pub steps: Vec<PlanStep>,
}

impl InitPlan {
    /// Collects the plan of a resolved container
    pub fn of(container: &Container) -> Result<InitPlan, NotResolved> {
        let mut steps = Vec::new();
        container.range(|node| {
            steps.push(PlanStep {
                product: node.key(),
                dependencies: node.dependencies().to_vec(),
                fallible: node.is_fallible(),
            });
            true
        })?;
        Ok(InitPlan { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Display for InitPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (position, step) in self.steps.iter().enumerate() {
            write!(f, "{}. {}", position + 1, step.product)?;
            if !step.dependencies.is_empty() {
                let dependencies = step
                    .dependencies
                    .iter()
                    .map(|key| key.type_name)
                    .collect::<Vec<_>>();
                write!(f, " <- ({})", dependencies.join(", "))?;
            }
            if step.fallible {
                f.write_str(" [fallible]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
