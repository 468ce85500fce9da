//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Compute kernel selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KernelType {
    /// Word-length and vowel-count histograms over text files
    Lexical,
    /// Circular cross-correlation of paired signal files
    Correlation,
}

/// workpulse - bounded master-worker compute framework
#[derive(Parser, Debug)]
#[command(name = "workpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input source files to process
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub sources: Vec<PathBuf>,

    /// Compute kernel to run over the sources
    #[arg(short = 'k', long, value_enum, default_value = "lexical")]
    pub kernel: KernelType,

    /// Number of worker threads (default: available cores minus the
    /// dispatcher, at least 1)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Separator tokens per lexical work unit
    #[arg(long, default_value_t = crate::config::DEFAULT_TOKENS_PER_UNIT)]
    pub tokens_per_unit: usize,

    /// Lag indices per correlation work unit
    #[arg(long, default_value_t = crate::config::DEFAULT_LAGS_PER_UNIT)]
    pub lags_per_unit: usize,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Worker pool size after applying the default sizing rule.
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().saturating_sub(1).max(1))
    }

    /// Validate argument combinations
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sources.is_empty() {
            anyhow::bail!("at least one source file is required");
        }
        if let Some(workers) = self.workers {
            if workers < 1 {
                anyhow::bail!("workers must be at least 1");
            }
        }
        if self.tokens_per_unit < 1 {
            anyhow::bail!("tokens-per-unit must be at least 1");
        }
        if self.lags_per_unit < 1 {
            anyhow::bail!("lags-per-unit must be at least 1");
        }
        Ok(())
    }
}
