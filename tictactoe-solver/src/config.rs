//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! seed = 42
//! clear_table_every = 10
//! opening_thresholds = [1, 4, 14, 23, 35, 48]
//!
//! [table]
//! capacity = 500000
//! eviction = "generational"
//!
//! [limits]
//! time_budget_ms = 2000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tictactoe_core::{MAX_SIZE, MIN_SIZE};

use crate::error::SolverError;
use crate::search::SearchLimits;
use crate::table::TableConfig;

/// Played-cell counts below which the opening strategy is used instead of
/// search, for sizes 3 through 8.
pub const DEFAULT_OPENING_THRESHOLDS: [usize; MAX_SIZE - MIN_SIZE + 1] = [1, 4, 14, 23, 35, 48];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub node_budget: Option<u64>,
    pub time_budget_ms: Option<u64>,
}

impl LimitsConfig {
    pub fn to_limits(&self) -> SearchLimits {
        SearchLimits {
            node_budget: self.node_budget,
            time_budget: self.time_budget_ms.map(Duration::from_millis),
            stop: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub table: TableConfig,
    /// Entry `i` applies to board size `3 + i`.
    pub opening_thresholds: [usize; MAX_SIZE - MIN_SIZE + 1],
    /// Clear the table every N `suggest_move` requests.
    pub clear_table_every: Option<u32>,
    /// Seed for move shuffling and opening tie breaks; random if unset.
    pub seed: Option<u64>,
    /// Shuffle moves before searching them.
    pub shuffle: bool,
    pub limits: LimitsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            opening_thresholds: DEFAULT_OPENING_THRESHOLDS,
            clear_table_every: None,
            seed: None,
            shuffle: true,
            limits: LimitsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, SolverError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, SolverError> {
        let text = fs::read_to_string(path).map_err(|source| SolverError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if self.table.capacity == Some(0) {
            return Err(SolverError::InvalidConfig("table capacity must be positive".into()));
        }
        if self.clear_table_every == Some(0) {
            return Err(SolverError::InvalidConfig("clear_table_every must be positive".into()));
        }
        for (i, &threshold) in self.opening_thresholds.iter().enumerate() {
            let size = MIN_SIZE + i;
            if threshold > size * size {
                return Err(SolverError::InvalidConfig(format!(
                    "opening threshold {threshold} exceeds the {} cells of a {size}x{size} board",
                    size * size
                )));
            }
        }
        Ok(())
    }

    /// Opening threshold for `size`.
    pub fn opening_threshold(&self, size: usize) -> usize {
        size.checked_sub(MIN_SIZE)
            .and_then(|i| self.opening_thresholds.get(i))
            .copied()
            .unwrap_or(0)
    }
}
