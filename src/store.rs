use std::collections::BTreeMap;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::exchange::{self, ImportError, StrategyDocument};
use crate::model::{Strategy, StrategyId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown strategy `{strategy_id}`")]
    UnknownStrategy { strategy_id: String },

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Serializing strategy: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory collection of strategy documents keyed by id.
///
/// Deleting a strategy drops its blocks and connections with it; nothing
/// else in the store refers to them.
#[derive(Debug, Default)]
pub struct StrategyStore {
    strategies: BTreeMap<StrategyId, Strategy>,
}

impl StrategyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty strategy and return its id.
    pub fn create(&mut self, name: &str, symbol: &str, timeframe: &str) -> StrategyId {
        self.insert(Strategy::new(name, symbol, timeframe))
    }

    pub fn insert(&mut self, strategy: Strategy) -> StrategyId {
        let id = strategy.id.clone();
        self.strategies.insert(id.clone(), strategy);
        id
    }

    pub fn get(&self, id: &str) -> Result<&Strategy, StoreError> {
        self.strategies
            .get(id)
            .ok_or_else(|| StoreError::UnknownStrategy {
                strategy_id: id.to_string(),
            })
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Strategy, StoreError> {
        self.strategies
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownStrategy {
                strategy_id: id.to_string(),
            })
    }

    pub fn delete(&mut self, id: &str) -> Result<Strategy, StoreError> {
        self.strategies
            .remove(id)
            .ok_or_else(|| StoreError::UnknownStrategy {
                strategy_id: id.to_string(),
            })
    }

    /// Strategies in id order.
    pub fn list(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.values()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Import a document as a new strategy with freshly minted ids.
    /// On failure the store is left untouched.
    pub fn import(&mut self, catalog: &Catalog, doc: &StrategyDocument) -> Result<StrategyId, StoreError> {
        let strategy = exchange::import(catalog, doc)?;
        tracing::debug!(strategy = %strategy.name, id = %strategy.id, "imported strategy");
        Ok(self.insert(strategy))
    }

    pub fn import_json(&mut self, catalog: &Catalog, json: &str) -> Result<StrategyId, StoreError> {
        let strategy = exchange::from_json(catalog, json)?;
        Ok(self.insert(strategy))
    }

    pub fn export(&self, id: &str) -> Result<StrategyDocument, StoreError> {
        Ok(exchange::export(self.get(id)?))
    }

    pub fn export_json(&self, id: &str) -> Result<String, StoreError> {
        Ok(exchange::to_json(self.get(id)?)?)
    }
}
