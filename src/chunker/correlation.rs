//! Correlation source chunking
//!
//! Each source is a binary container holding one signal pair plus the
//! expected correlation results, in the fixed little-endian layout
//! `i32 n`, `n × f64 x`, `n × f64 y`, `n × f64 expected`.
//!
//! The chunker loads a source exactly once, immediately before emitting its
//! first unit, then batches consecutive lag indices into fixed-width units;
//! the final unit of a source pads unused slots with the sentinel rather than
//! shrinking. Every unit carries shared handles to the full signal vectors,
//! released after the source's last unit is emitted. The expected-result
//! vectors are retained for handover to the accumulator.
//!
//! The container format is trusted metadata: a source that cannot be opened
//! or whose length fields cannot be satisfied is fatal to the whole run.

use crate::chunker::Chunker;
use crate::protocol::{CorrelationUnit, SENTINEL_LAG};
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decoded contents of one signal container.
pub struct SignalFile {
    pub num_samples: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub expected: Vec<f64>,
}

impl SignalFile {
    /// Read a container in its fixed layout. Short reads are errors, not
    /// partial data.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("unable to open signal file {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let num_samples = read_i32(&mut reader)
            .with_context(|| format!("reading sample count from {}", path.display()))?;
        if num_samples < 0 {
            anyhow::bail!(
                "signal file {} declares a negative sample count ({num_samples})",
                path.display()
            );
        }
        let num_samples = num_samples as usize;

        let x = read_f64_vec(&mut reader, num_samples)
            .with_context(|| format!("reading signal x from {}", path.display()))?;
        let y = read_f64_vec(&mut reader, num_samples)
            .with_context(|| format!("reading signal y from {}", path.display()))?;
        let expected = read_f64_vec(&mut reader, num_samples)
            .with_context(|| format!("reading expected results from {}", path.display()))?;

        Ok(Self {
            num_samples,
            x,
            y,
            expected,
        })
    }
}

fn read_i32<R: Read>(reader: &mut R) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f64_vec<R: Read>(reader: &mut R, len: usize) -> std::io::Result<Vec<f64>> {
    let mut values = Vec::with_capacity(len);
    let mut buf = [0u8; 8];
    for _ in 0..len {
        reader.read_exact(&mut buf)?;
        values.push(f64::from_le_bytes(buf));
    }
    Ok(values)
}

struct LoadedSource {
    id: usize,
    num_samples: usize,
    x: Arc<Vec<f64>>,
    y: Arc<Vec<f64>>,
    next_lag: usize,
}

/// Produces [`CorrelationUnit`]s of `lags_per_unit` lag slots each.
pub struct CorrelationChunker {
    sources: Vec<PathBuf>,
    next_source: usize,
    lags_per_unit: usize,
    current: Option<LoadedSource>,
    expected: Vec<(usize, Vec<f64>)>,
}

impl CorrelationChunker {
    pub fn new(sources: &[PathBuf], lags_per_unit: usize) -> Self {
        Self {
            sources: sources.to_vec(),
            next_source: 0,
            lags_per_unit,
            current: None,
            expected: Vec::new(),
        }
    }

    /// Hand over the expected-result vectors collected while loading
    /// sources. Call after the dispatch loop, before finalizing the
    /// accumulator.
    pub fn take_expected(&mut self) -> Vec<(usize, Vec<f64>)> {
        std::mem::take(&mut self.expected)
    }
}

impl Chunker for CorrelationChunker {
    type Unit = CorrelationUnit;

    fn next_unit(&mut self) -> Result<Option<CorrelationUnit>> {
        loop {
            if self.current.is_none() {
                if self.next_source >= self.sources.len() {
                    return Ok(None);
                }
                let id = self.next_source;
                self.next_source += 1;
                let signal = SignalFile::load(&self.sources[id])?;
                log::debug!(
                    "loaded source {id}: {} samples from {}",
                    signal.num_samples,
                    self.sources[id].display()
                );
                self.expected.push((id, signal.expected));
                self.current = Some(LoadedSource {
                    id,
                    num_samples: signal.num_samples,
                    x: Arc::new(signal.x),
                    y: Arc::new(signal.y),
                    next_lag: 0,
                });
            }

            let src = self.current.as_mut().expect("source is loaded");
            if src.next_lag >= src.num_samples {
                // Empty signal: nothing to dispatch for this source.
                self.current = None;
                continue;
            }

            let end = (src.next_lag + self.lags_per_unit).min(src.num_samples);
            let mut lags: Vec<i32> = (src.next_lag..end).map(|t| t as i32).collect();
            lags.resize(self.lags_per_unit, SENTINEL_LAG);

            let unit = CorrelationUnit::new(
                src.id,
                src.num_samples,
                lags,
                Arc::clone(&src.x),
                Arc::clone(&src.y),
            )?;
            src.next_lag = end;
            if src.next_lag == src.num_samples {
                // Last unit of the source: drop our signal handles.
                self.current = None;
            }
            return Ok(Some(unit));
        }
    }
}
