use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::error::{CamStackError, CamStackResult};
use crate::node::evaluator::NodeEvaluator;

/// Builds a host-defined evaluator from its JSON parameters.
pub type NodeFactory = dyn Fn(&serde_json::Value) -> CamStackResult<Box<dyn NodeEvaluator>>;

/// Factories for [`crate::NodeDef::Custom`] node kinds.
#[derive(Default)]
pub struct NodeRegistry {
    factories: BTreeMap<String, Box<NodeFactory>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value) -> CamStackResult<Box<dyn NodeEvaluator>> + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn create(
        &self,
        kind: &str,
        params: &serde_json::Value,
    ) -> CamStackResult<Box<dyn NodeEvaluator>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| CamStackError::construction(format!("unknown node kind '{kind}'")))?;
        factory(params)
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
