//! Tournament configuration, loaded from TOML.
//!
//! ```toml
//! players = ["Ann", "Bob", "Cid"]
//! seed = 7
//! max_blocks = 2
//!
//! [model]
//! max_iterations = 200
//! tolerance = 1e-8
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use seating_core::{check_unique, FitOptions, PlayerId};

use crate::error::{TournamentError, TournamentResult};

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TournamentConfig {
    /// Player names; their order fixes the design's symbol mapping
    pub players: Vec<String>,
    /// Fixed seed for reproducible seating (None = OS entropy)
    pub seed: Option<u64>,
    /// Stop on its own after this many blocks
    pub max_blocks: Option<u32>,
    pub model: FitOptions,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            players: ["A", "B", "C", "D", "E", "F", "G"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            seed: None,
            max_blocks: None,
            model: FitOptions::default(),
        }
    }
}

impl TournamentConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> TournamentResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| TournamentError::ReadConfig {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> TournamentResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TournamentResult<()> {
        if self.players.is_empty() {
            return Err(TournamentError::InvalidConfig(
                "at least one player is required".to_string(),
            ));
        }
        if let Some(blank) = self.players.iter().position(|p| p.trim().is_empty()) {
            return Err(TournamentError::InvalidConfig(format!(
                "player #{} has an empty name",
                blank + 1
            )));
        }
        if self.max_blocks == Some(0) {
            return Err(TournamentError::InvalidConfig(
                "max_blocks must be at least 1".to_string(),
            ));
        }
        if !(self.model.tolerance > 0.0) {
            return Err(TournamentError::InvalidConfig(
                "model.tolerance must be positive".to_string(),
            ));
        }
        check_unique(&self.player_ids())?;
        Ok(())
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| PlayerId::new(p.trim())).collect()
    }
}
