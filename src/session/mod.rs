//! Layout session: one loaded contract set, one declaration table, memoized layouts.
//!
//! ```text
//!   CLI / decoder
//!     → LayoutSession::layout(name)   (this module, cached per contract)
//!       → inherited_state_variables   (allocate)
//! ```
//!
//! The declaration table is built once when the session is created and is
//! read-only afterwards. Computed layouts are handed out as `Arc`s so callers
//! can keep them after the session is dropped.

use crate::allocate::{
    inherited_state_variables, reference_declarations, DeclarationTable, VariableReferences,
};
use crate::ast::{ContractResolver, ContractSet};
use crate::config::LayoutConfig;
use crate::errors::LayoutError;
use reth_tracing::tracing::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Snapshot of layout cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Layouts served from the cache
    pub hits: u64,
    /// Layouts that had to be computed
    pub misses: u64,
    /// Layouts currently cached
    pub cached: usize,
}

#[derive(Debug)]
pub struct LayoutSession {
    contracts: ContractSet,
    table: DeclarationTable,
    config: LayoutConfig,
    layouts: HashMap<String, Arc<VariableReferences>>,
    stats: SessionStats,
}

impl LayoutSession {
    /// Build the declaration table for `contracts`, including file-level definitions.
    pub fn new(contracts: ContractSet, config: LayoutConfig) -> Self {
        let mut table = reference_declarations(contracts.definitions());
        table.extend_from(contracts.free_declarations());
        debug!(
            target: "storage_layout::session",
            contracts = contracts.len(),
            declarations = table.len(),
            "session ready"
        );
        Self {
            contracts,
            table,
            config,
            layouts: HashMap::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn contracts(&self) -> &ContractSet {
        &self.contracts
    }

    pub fn table(&self) -> &DeclarationTable {
        &self.table
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Storage layout of `name` including inherited variables.
    ///
    /// A contract without declaration data has an empty layout.
    pub fn layout(&mut self, name: &str) -> Result<Arc<VariableReferences>, LayoutError> {
        if let Some(layout) = self.layouts.get(name) {
            self.stats.hits += 1;
            return Ok(Arc::clone(layout));
        }
        self.stats.misses += 1;

        let variables = match self.contracts.contract_node(name) {
            Some(contract) => {
                inherited_state_variables(contract, &self.contracts, &self.table, &self.config)?
            }
            None => {
                warn!(target: "storage_layout::session", contract = name, "no declaration data, layout is empty");
                VariableReferences::new()
            }
        };

        let layout = Arc::new(variables);
        self.layouts.insert(name.to_string(), Arc::clone(&layout));
        self.stats.cached = self.layouts.len();
        Ok(layout)
    }

    /// Change the layout options; cached layouts are dropped.
    pub fn set_config(&mut self, config: LayoutConfig) {
        if config != self.config {
            self.config = config;
            self.clear();
        }
    }

    /// Drop every cached layout.
    pub fn clear(&mut self) {
        self.layouts.clear();
        self.stats.cached = 0;
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.clone()
    }
}
