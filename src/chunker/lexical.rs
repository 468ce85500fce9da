//! Lexical source chunking
//!
//! Reads raw bytes from each source through the shared [`CharScanner`] and
//! accumulates them until the separator quota is reached, then cuts the unit
//! immediately after that separator. Because the scanner folds multi-byte
//! sequences before classification, a cut can never land inside an accented
//! vowel or a curly quote, and never inside a word except at end of source.
//!
//! A source that fails to open is skipped with a diagnostic and the run
//! continues with the remaining sources. A unit that would outgrow its byte
//! capacity before reaching the quota aborts the run: silent truncation would
//! corrupt the histograms.

use crate::chunker::Chunker;
use crate::kernel::charclass::{CharClass, CharScanner};
use crate::protocol::LexicalUnit;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, Bytes, Read};
use std::path::PathBuf;

struct OpenSource {
    id: usize,
    path: PathBuf,
    bytes: Bytes<BufReader<File>>,
}

/// Produces [`LexicalUnit`]s of at most `tokens_per_unit` separators each.
pub struct LexicalChunker {
    sources: Vec<PathBuf>,
    next_source: usize,
    tokens_per_unit: usize,
    unit_capacity: usize,
    current: Option<OpenSource>,
}

impl LexicalChunker {
    pub fn new(sources: &[PathBuf], tokens_per_unit: usize, unit_capacity: usize) -> Self {
        Self {
            sources: sources.to_vec(),
            next_source: 0,
            tokens_per_unit,
            unit_capacity,
            current: None,
        }
    }

    /// Open the next readable source, skipping and logging the ones that
    /// fail to open. Returns false once no sources remain.
    fn open_next_source(&mut self) -> bool {
        while self.next_source < self.sources.len() {
            let id = self.next_source;
            self.next_source += 1;
            let path = self.sources[id].clone();
            match File::open(&path) {
                Ok(file) => {
                    log::debug!("chunking source {id}: {}", path.display());
                    self.current = Some(OpenSource {
                        id,
                        path,
                        bytes: BufReader::new(file).bytes(),
                    });
                    return true;
                }
                Err(e) => {
                    log::warn!("skipping source {}: {e}", path.display());
                }
            }
        }
        false
    }
}

impl Chunker for LexicalChunker {
    type Unit = LexicalUnit;

    fn next_unit(&mut self) -> Result<Option<LexicalUnit>> {
        loop {
            if self.current.is_none() && !self.open_next_source() {
                return Ok(None);
            }
            let src = self.current.as_mut().expect("source is open");
            let id = src.id;

            let mut buf = Vec::new();
            let mut scanner = CharScanner::new();
            let mut separators = 0;
            let mut end_of_source = false;

            while separators < self.tokens_per_unit {
                match src.bytes.next() {
                    Some(Ok(byte)) => {
                        buf.push(byte);
                        if buf.len() > self.unit_capacity {
                            anyhow::bail!(
                                "source {} overflows the {}-byte unit capacity before \
                                 reaching {} separators",
                                src.path.display(),
                                self.unit_capacity,
                                self.tokens_per_unit
                            );
                        }
                        if scanner.push(byte) == Some(CharClass::Separator) {
                            separators += 1;
                        }
                    }
                    Some(Err(e)) => {
                        let path = src.path.clone();
                        return Err(e)
                            .with_context(|| format!("reading source {}", path.display()));
                    }
                    None => {
                        end_of_source = true;
                        break;
                    }
                }
            }

            if end_of_source {
                self.current = None;
            }
            if buf.is_empty() {
                // Source ended exactly on a previous unit boundary.
                continue;
            }
            return Ok(Some(LexicalUnit::new(id, buf, self.unit_capacity)?));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_source(text: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(text.as_bytes()).unwrap();
        f
    }

    fn collect_units(chunker: &mut LexicalChunker) -> Vec<LexicalUnit> {
        let mut units = Vec::new();
        while let Some(unit) = chunker.next_unit().unwrap() {
            units.push(unit);
        }
        units
    }

    #[test]
    fn test_concatenated_units_reproduce_source() {
        let text = "one two three four five six seven";
        let f = write_source(text);
        let mut chunker = LexicalChunker::new(&[f.path().to_path_buf()], 2, 1024);
        let units = collect_units(&mut chunker);
        assert!(units.len() > 1);

        let rebuilt: Vec<u8> = units.iter().flat_map(|u| u.bytes.clone()).collect();
        assert_eq!(rebuilt, text.as_bytes());
    }

    #[test]
    fn test_boundaries_fall_after_separators() {
        let text = "alpha beta gamma delta epsilon ";
        let f = write_source(text);
        let mut chunker = LexicalChunker::new(&[f.path().to_path_buf()], 2, 1024);
        let units = collect_units(&mut chunker);
        for unit in &units {
            assert_eq!(*unit.bytes.last().unwrap(), b' ');
        }
    }

    #[test]
    fn test_final_unit_may_end_mid_word() {
        let f = write_source("one two tail");
        let mut chunker = LexicalChunker::new(&[f.path().to_path_buf()], 2, 1024);
        let units = collect_units(&mut chunker);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].bytes, b"one two ");
        assert_eq!(units[1].bytes, b"tail");
    }

    #[test]
    fn test_multibyte_separator_kept_whole() {
        // The em dash (0xE2 0x80 0x94) is the first separator; all three of
        // its bytes must land in the same unit.
        let text = "ab\u{2014}cd ef";
        let f = write_source(text);
        let mut chunker = LexicalChunker::new(&[f.path().to_path_buf()], 1, 1024);
        let units = collect_units(&mut chunker);
        assert_eq!(units[0].bytes, "ab\u{2014}".as_bytes());
    }

    #[test]
    fn test_exhausted_is_terminal() {
        let f = write_source("a b ");
        let mut chunker = LexicalChunker::new(&[f.path().to_path_buf()], 10, 1024);
        while chunker.next_unit().unwrap().is_some() {}
        assert!(chunker.next_unit().unwrap().is_none());
    }

    #[test]
    fn test_missing_source_skipped() {
        let f = write_source("still processed ");
        let sources = vec![
            PathBuf::from("/nonexistent/missing.txt"),
            f.path().to_path_buf(),
        ];
        let mut chunker = LexicalChunker::new(&sources, 10, 1024);
        let units = collect_units(&mut chunker);
        assert_eq!(units.len(), 1);
        // Source ids keep their command-line position even after a skip.
        assert_eq!(units[0].source_id, 1);
    }

    #[test]
    fn test_capacity_overflow_is_fatal() {
        let f = write_source(&"x".repeat(64));
        let mut chunker = LexicalChunker::new(&[f.path().to_path_buf()], 1, 16);
        assert!(chunker.next_unit().is_err());
    }

    #[test]
    fn test_unit_word_counts_sum_to_single_pass() {
        use crate::kernel::{Kernel, LexicalKernel};

        // Summing the kernel over chunked units must equal one-pass
        // tokenization of the whole source, for any separator quota.
        let text = "the caf\u{00E9} isn\u{2019}t open - said the \u{201C}sign\u{201D}, twice twice ";
        let f = write_source(text);
        let kernel = LexicalKernel::new();

        let whole = kernel.process(&LexicalUnit {
            source_id: 0,
            bytes: text.as_bytes().to_vec(),
        });

        for quota in [1, 2, 3, 100] {
            let mut chunker = LexicalChunker::new(&[f.path().to_path_buf()], quota, 4096);
            let chunked: u64 = collect_units(&mut chunker)
                .iter()
                .map(|u| kernel.process(u).words)
                .sum();
            assert_eq!(chunked, whole.words, "quota {quota}");
        }
    }

    #[test]
    fn test_multiple_sources_in_order() {
        let f1 = write_source("first ");
        let f2 = write_source("second ");
        let sources = vec![f1.path().to_path_buf(), f2.path().to_path_buf()];
        let mut chunker = LexicalChunker::new(&sources, 10, 1024);
        let units = collect_units(&mut chunker);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].source_id, 0);
        assert_eq!(units[1].source_id, 1);
    }
}
