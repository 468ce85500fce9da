//! Configuration module
//!
//! Handles CLI argument parsing, capacity constants, and validation.

pub mod cli;

use cli::{Cli, KernelType};
use std::path::PathBuf;

/// Largest word length the lexical histograms track, in logical characters.
/// Also bounds the vowel axis of the joint histogram.
pub const MAX_WORD_LEN: usize = 20;

/// Default number of separator tokens per lexical work unit.
pub const DEFAULT_TOKENS_PER_UNIT: usize = 1000;

/// Default number of lag indices per correlation work unit.
pub const DEFAULT_LAGS_PER_UNIT: usize = 40;

/// Complete run configuration, assembled from the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which compute kernel to dispatch.
    pub kernel: KernelType,
    /// Input sources, in command-line order. Source ids index this list.
    pub sources: Vec<PathBuf>,
    /// Fixed worker pool size (>= 1).
    pub workers: usize,
    /// Separator quota per lexical unit.
    pub tokens_per_unit: usize,
    /// Lag slots per correlation unit.
    pub lags_per_unit: usize,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            kernel: cli.kernel,
            sources: cli.sources.clone(),
            workers: cli.effective_workers(),
            tokens_per_unit: cli.tokens_per_unit,
            lags_per_unit: cli.lags_per_unit,
        }
    }

    /// Maximum byte length of one lexical unit. Sized so that a unit holding
    /// its full separator quota of maximum-length words still fits.
    pub fn lexical_unit_capacity(&self) -> usize {
        self.tokens_per_unit * (MAX_WORD_LEN + 1)
    }
}
