//! Correlation result accumulation and verification
//!
//! Assembles per-source lag vectors from partial results, then diffs each
//! assembled vector against the expected results read alongside the source.
//! Each lag is written by exactly one partial, so merges commute trivially;
//! the comparison uses exact `f64` equality, as the expected vectors were
//! produced by the same arithmetic.

use crate::accumulator::Accumulator;
use crate::protocol::{CorrelationPartial, ProtocolError, SENTINEL_LAG};
use crate::Result;
use std::collections::HashMap;

#[derive(Debug)]
struct CorrelationState {
    results: Vec<f64>,
    expected: Option<Vec<f64>>,
}

/// Finalized per-source verification results.
#[derive(Debug, Clone)]
pub struct CorrelationSourceReport {
    pub source_id: usize,
    pub name: String,
    pub num_samples: usize,
    pub mismatches: usize,
    pub error_rate: f64,
}

/// Finalized correlation report, sources in command-line order.
#[derive(Debug, Clone)]
pub struct CorrelationReport {
    pub sources: Vec<CorrelationSourceReport>,
}

/// Merges correlation partials and verifies them against expected results.
pub struct CorrelationAccumulator {
    source_names: Vec<String>,
    state: HashMap<usize, CorrelationState>,
}

impl CorrelationAccumulator {
    pub fn new(source_names: Vec<String>) -> Self {
        Self {
            source_names,
            state: HashMap::new(),
        }
    }

    /// Install the expected-result vector handed over from the chunker.
    pub fn set_expected(&mut self, source_id: usize, expected: Vec<f64>) -> Result<()> {
        if source_id >= self.source_names.len() {
            anyhow::bail!(
                "expected results for unknown source id {source_id} (have {} sources)",
                self.source_names.len()
            );
        }
        let state = self.state.entry(source_id).or_insert_with(|| CorrelationState {
            results: vec![0.0; expected.len()],
            expected: None,
        });
        if state.results.len() != expected.len() {
            anyhow::bail!(
                "expected results for source {source_id} hold {} samples, computed {}",
                expected.len(),
                state.results.len()
            );
        }
        state.expected = Some(expected);
        Ok(())
    }
}

impl Accumulator for CorrelationAccumulator {
    type Partial = CorrelationPartial;
    type Report = CorrelationReport;

    fn merge(&mut self, partial: CorrelationPartial) -> Result<()> {
        if partial.source_id >= self.source_names.len() {
            anyhow::bail!(
                "partial result for unknown source id {} (have {} sources)",
                partial.source_id,
                self.source_names.len()
            );
        }
        let state = self
            .state
            .entry(partial.source_id)
            .or_insert_with(|| CorrelationState {
                results: vec![0.0; partial.num_samples],
                expected: None,
            });

        for (&lag, &value) in partial.lags.iter().zip(&partial.values) {
            if lag == SENTINEL_LAG {
                continue;
            }
            let slot = state.results.get_mut(lag as usize).ok_or(
                ProtocolError::LagOutOfRange {
                    lag,
                    num_samples: partial.num_samples,
                },
            )?;
            *slot = value;
        }
        Ok(())
    }

    fn finalize(self) -> Result<CorrelationReport> {
        let mut ids: Vec<usize> = self.state.keys().copied().collect();
        ids.sort_unstable();

        let mut sources = Vec::with_capacity(ids.len());
        for id in ids {
            let state = &self.state[&id];
            let expected = state.expected.as_ref().ok_or_else(|| {
                anyhow::anyhow!("no expected results installed for source {id}")
            })?;

            let mismatches = state
                .results
                .iter()
                .zip(expected)
                .filter(|(computed, expected)| computed != expected)
                .count();
            let num_samples = state.results.len();
            let error_rate = if num_samples == 0 {
                0.0
            } else {
                mismatches as f64 / num_samples as f64
            };

            sources.push(CorrelationSourceReport {
                source_id: id,
                name: self.source_names[id].clone(),
                num_samples,
                mismatches,
                error_rate,
            });
        }
        Ok(CorrelationReport { sources })
    }
}
