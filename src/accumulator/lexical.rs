//! Lexical result accumulation and report derivation
//!
//! Merges [`LexicalPartial`]s into per-source histograms and, at the end,
//! derives the percentage tables: the share of words at each length, and the
//! joint matrix giving, for each word length, the share of its words holding
//! each vowel count.

use crate::accumulator::Accumulator;
use crate::config::MAX_WORD_LEN;
use crate::protocol::LexicalPartial;
use crate::Result;
use std::collections::HashMap;

/// Accumulated global state for one text source.
#[derive(Debug, Default, Clone)]
struct LexicalState {
    total_words: u64,
    max_word_len: usize,
    max_vowels: usize,
    lengths: [u64; MAX_WORD_LEN],
    vowels_by_length: [[u64; MAX_WORD_LEN]; MAX_WORD_LEN + 1],
}

/// Finalized per-source lexical results.
#[derive(Debug, Clone)]
pub struct LexicalSourceReport {
    pub source_id: usize,
    pub name: String,
    pub total_words: u64,
    /// Longest observed word in logical characters (may exceed the tracked
    /// histogram width when oversized words saturated the top bucket).
    pub max_word_len: usize,
    pub max_vowels: usize,
    /// Word counts for lengths `1..=table_len()`.
    pub length_counts: Vec<u64>,
    /// `100 * count / total_words` for lengths `1..=table_len()`.
    pub length_pct: Vec<f64>,
    /// `vowel_pct[v][k-1]`: percentage of words of length `k` containing
    /// exactly `v` vowels. Rows `0..=max_vowel_row()`.
    pub vowel_pct: Vec<Vec<f64>>,
}

impl LexicalSourceReport {
    /// Width of the histogram tables.
    pub fn table_len(&self) -> usize {
        self.length_counts.len()
    }

    pub fn max_vowel_row(&self) -> usize {
        self.vowel_pct.len().saturating_sub(1)
    }
}

/// Finalized lexical report, sources in command-line order.
#[derive(Debug, Clone)]
pub struct LexicalReport {
    pub sources: Vec<LexicalSourceReport>,
}

/// Merges lexical partials into per-source global state.
pub struct LexicalAccumulator {
    source_names: Vec<String>,
    state: HashMap<usize, LexicalState>,
}

impl LexicalAccumulator {
    pub fn new(source_names: Vec<String>) -> Self {
        Self {
            source_names,
            state: HashMap::new(),
        }
    }
}

impl Accumulator for LexicalAccumulator {
    type Partial = LexicalPartial;
    type Report = LexicalReport;

    fn merge(&mut self, partial: LexicalPartial) -> Result<()> {
        if partial.source_id >= self.source_names.len() {
            anyhow::bail!(
                "partial result for unknown source id {} (have {} sources)",
                partial.source_id,
                self.source_names.len()
            );
        }
        let state = self.state.entry(partial.source_id).or_default();

        state.total_words += partial.words;
        state.max_word_len = state.max_word_len.max(partial.max_word_len);
        state.max_vowels = state.max_vowels.max(partial.max_vowels);
        for (total, count) in state.lengths.iter_mut().zip(partial.lengths) {
            *total += count;
        }
        for (total_row, row) in state
            .vowels_by_length
            .iter_mut()
            .zip(partial.vowels_by_length)
        {
            for (total, count) in total_row.iter_mut().zip(row) {
                *total += count;
            }
        }
        Ok(())
    }

    fn finalize(self) -> Result<LexicalReport> {
        let mut ids: Vec<usize> = self.state.keys().copied().collect();
        ids.sort_unstable();

        let mut sources = Vec::with_capacity(ids.len());
        for id in ids {
            let state = &self.state[&id];
            let table_len = state.max_word_len.min(MAX_WORD_LEN);
            let vowel_rows = state.max_vowels.min(MAX_WORD_LEN);

            let length_counts: Vec<u64> = state.lengths[..table_len].to_vec();
            let length_pct: Vec<f64> = length_counts
                .iter()
                .map(|&count| {
                    if state.total_words == 0 {
                        0.0
                    } else {
                        count as f64 / state.total_words as f64 * 100.0
                    }
                })
                .collect();

            // Cell (v, k) is the share of length-k words holding exactly v
            // vowels; a length with no words reports 0.0 across the column.
            let vowel_pct: Vec<Vec<f64>> = (0..=vowel_rows)
                .map(|v| {
                    (0..table_len)
                        .map(|k| {
                            if state.lengths[k] == 0 {
                                0.0
                            } else {
                                state.vowels_by_length[v][k] as f64
                                    / state.lengths[k] as f64
                                    * 100.0
                            }
                        })
                        .collect()
                })
                .collect();

            sources.push(LexicalSourceReport {
                source_id: id,
                name: self.source_names[id].clone(),
                total_words: state.total_words,
                max_word_len: state.max_word_len,
                max_vowels: state.max_vowels,
                length_counts,
                length_pct,
                vowel_pct,
            });
        }
        Ok(LexicalReport { sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Kernel, LexicalKernel};
    use crate::protocol::LexicalUnit;

    fn partial_for(text: &str, source_id: usize) -> LexicalPartial {
        LexicalKernel::new().process(&LexicalUnit {
            source_id,
            bytes: text.as_bytes().to_vec(),
        })
    }

    fn accumulator(n: usize) -> LexicalAccumulator {
        LexicalAccumulator::new((0..n).map(|i| format!("src{i}")).collect())
    }

    #[test]
    fn test_merge_and_percentages() {
        let mut acc = accumulator(1);
        acc.merge(partial_for("ab ab abc ", 0)).unwrap();

        let report = acc.finalize().unwrap();
        let src = &report.sources[0];
        assert_eq!(src.total_words, 3);
        assert_eq!(src.length_counts, vec![0, 2, 1]);
        assert!((src.length_pct[1] - 66.666).abs() < 0.01);
        assert!((src.length_pct[2] - 33.333).abs() < 0.01);
        // Both 2-char words hold one vowel: 100% of length 2 at row 1.
        assert_eq!(src.vowel_pct[1][1], 100.0);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let p1 = partial_for("alpha beta ", 0);
        let p2 = partial_for("gamma delta epsilon ", 0);
        let p3 = partial_for("zeta ", 0);

        let mut forward = accumulator(1);
        for p in [p1.clone(), p2.clone(), p3.clone()] {
            forward.merge(p).unwrap();
        }
        let mut reverse = accumulator(1);
        for p in [p3, p2, p1] {
            reverse.merge(p).unwrap();
        }

        let a = forward.finalize().unwrap();
        let b = reverse.finalize().unwrap();
        let (a, b) = (&a.sources[0], &b.sources[0]);
        assert_eq!(a.total_words, b.total_words);
        assert_eq!(a.length_counts, b.length_counts);
        assert_eq!(a.vowel_pct, b.vowel_pct);
        assert_eq!(a.max_word_len, b.max_word_len);
    }

    #[test]
    fn test_sources_kept_separate() {
        let mut acc = accumulator(2);
        acc.merge(partial_for("one ", 0)).unwrap();
        acc.merge(partial_for("two three ", 1)).unwrap();

        let report = acc.finalize().unwrap();
        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.sources[0].total_words, 1);
        assert_eq!(report.sources[1].total_words, 2);
        assert_eq!(report.sources[1].name, "src1");
    }

    #[test]
    fn test_unknown_source_rejected() {
        let mut acc = accumulator(1);
        assert!(acc.merge(partial_for("word ", 7)).is_err());
    }

    #[test]
    fn test_skipped_source_absent_from_report() {
        let mut acc = accumulator(3);
        acc.merge(partial_for("word ", 2)).unwrap();
        let report = acc.finalize().unwrap();
        assert_eq!(report.sources.len(), 1);
        assert_eq!(report.sources[0].source_id, 2);
    }
}
