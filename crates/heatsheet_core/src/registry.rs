//! Strategy registry mapping document kinds to strategies.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::WorkspaceConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::CompetitionData;
use crate::strategies;
use crate::strategy::{DocumentKind, DocumentStrategy};

/// A registry of document strategies.
///
/// The registry maps each [`DocumentKind`] to one strategy, allowing the
/// generator and the CLI to look strategies up by kind.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<DocumentKind, Arc<dyn DocumentStrategy>>,
}

impl StrategyRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }

    /// Assemble the six predefined strategies over one data set.
    pub fn standard(data: Arc<CompetitionData>, config: &WorkspaceConfig) -> CoreResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(strategies::certificates(&data, config)?));
        registry.register(Arc::new(strategies::result_list(&data, config)?));
        registry.register(Arc::new(strategies::participant_list(&data, config)?));
        registry.register(Arc::new(strategies::time_forms(&data, config)?));
        registry.register(Arc::new(strategies::start_list(&data, config)?));
        registry.register(Arc::new(strategies::race_cards(&data, config)?));
        Ok(registry)
    }

    /// Register a strategy under its `kind()`.
    ///
    /// A strategy already registered for the same kind is replaced.
    pub fn register(&mut self, strategy: Arc<dyn DocumentStrategy>) {
        let kind = strategy.kind();
        debug!("Registering strategy: {}", kind);
        self.strategies.insert(kind, strategy);
    }

    /// Get a strategy by kind.
    pub fn get(&self, kind: DocumentKind) -> Option<Arc<dyn DocumentStrategy>> {
        self.strategies.get(&kind).cloned()
    }

    /// Get a strategy by kind, returning an error if not found.
    pub fn get_required(&self, kind: DocumentKind) -> CoreResult<Arc<dyn DocumentStrategy>> {
        self.get(kind)
            .ok_or_else(|| CoreError::StrategyNotRegistered(kind.to_string()))
    }

    pub fn contains(&self, kind: DocumentKind) -> bool {
        self.strategies.contains_key(&kind)
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<DocumentKind> {
        self.strategies.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.kinds())
            .finish()
    }
}
