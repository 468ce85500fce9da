//! Lexical histogram kernel
//!
//! Re-derives word boundaries from a unit's byte buffer using the same
//! [`CharScanner`] the chunker uses, so kernel and chunker segmentation agree
//! exactly. A word is a maximal run of non-separator logical characters;
//! multi-byte sequences count as one character, glue characters (apostrophes)
//! join sequences without adding length, and a zero-length run between
//! consecutive separators contributes nothing.

use crate::config::MAX_WORD_LEN;
use crate::kernel::charclass::{CharClass, CharScanner};
use crate::kernel::Kernel;
use crate::protocol::{LexicalPartial, LexicalUnit};

/// Stateless word-length / vowel-count histogram kernel.
#[derive(Debug, Default)]
pub struct LexicalKernel;

impl LexicalKernel {
    pub fn new() -> Self {
        Self
    }

    fn close_word(partial: &mut LexicalPartial, word_len: usize, vowels: usize) {
        if word_len == 0 {
            return;
        }
        partial.words += 1;
        if word_len > partial.max_word_len {
            partial.max_word_len = word_len;
        }
        if vowels > partial.max_vowels {
            partial.max_vowels = vowels;
        }
        // Words beyond the tracked maximum saturate into the top bucket.
        let len_idx = word_len.min(MAX_WORD_LEN) - 1;
        let vowel_idx = vowels.min(MAX_WORD_LEN);
        partial.lengths[len_idx] += 1;
        partial.vowels_by_length[vowel_idx][len_idx] += 1;
    }
}

impl Kernel for LexicalKernel {
    type Unit = LexicalUnit;
    type Partial = LexicalPartial;

    fn process(&self, unit: &LexicalUnit) -> LexicalPartial {
        let mut partial = LexicalPartial::empty(unit.source_id);
        let mut scanner = CharScanner::new();
        let mut word_len = 0usize;
        let mut vowels = 0usize;

        for &byte in &unit.bytes {
            match scanner.push(byte) {
                None | Some(CharClass::Glue) => {}
                Some(CharClass::Separator) => {
                    Self::close_word(&mut partial, word_len, vowels);
                    word_len = 0;
                    vowels = 0;
                }
                Some(CharClass::Vowel) => {
                    word_len += 1;
                    vowels += 1;
                }
                Some(CharClass::Regular) => {
                    word_len += 1;
                }
            }
        }
        // A unit may end mid-word only at end of source; that word is real.
        Self::close_word(&mut partial, word_len, vowels);
        partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process_text(text: &str) -> LexicalPartial {
        let unit = LexicalUnit {
            source_id: 0,
            bytes: text.as_bytes().to_vec(),
        };
        LexicalKernel::new().process(&unit)
    }

    #[test]
    fn test_basic_words() {
        let p = process_text("hello world ");
        assert_eq!(p.words, 2);
        assert_eq!(p.lengths[4], 2); // both words have 5 characters
        assert_eq!(p.max_word_len, 5);
        assert_eq!(p.max_vowels, 2); // "hello"
        assert_eq!(p.vowels_by_length[2][4], 1); // hello: 2 vowels, length 5
        assert_eq!(p.vowels_by_length[1][4], 1); // world: 1 vowel, length 5
    }

    #[test]
    fn test_trailing_word_without_separator() {
        let p = process_text("abc");
        assert_eq!(p.words, 1);
        assert_eq!(p.lengths[2], 1);
    }

    #[test]
    fn test_consecutive_separators_contribute_nothing() {
        let p = process_text("a  ,, b");
        assert_eq!(p.words, 2);
        assert_eq!(p.lengths[0], 2);
    }

    #[test]
    fn test_empty_unit() {
        let p = process_text("");
        assert_eq!(p.words, 0);
        assert_eq!(p.max_word_len, 0);
    }

    #[test]
    fn test_accented_vowel_adds_one_length_one_vowel() {
        let plain = process_text("ab ");
        let accented = process_text("abé ");
        assert_eq!(plain.max_word_len + 1, accented.max_word_len);
        assert_eq!(plain.max_vowels + 1, accented.max_vowels);
        assert_eq!(accented.lengths[2], 1); // é is one character, not two
    }

    #[test]
    fn test_curly_apostrophe_does_not_split() {
        // "don’t" is one word of 4 characters with 1 vowel.
        let p = process_text("don\u{2019}t ");
        assert_eq!(p.words, 1);
        assert_eq!(p.lengths[3], 1);
        assert_eq!(p.vowels_by_length[1][3], 1);
    }

    #[test]
    fn test_straight_apostrophe_does_not_split() {
        let p = process_text("don't ");
        assert_eq!(p.words, 1);
        assert_eq!(p.lengths[3], 1);
    }

    #[test]
    fn test_quoted_word() {
        // Curly quotes separate; the quoted word keeps its own length.
        let p = process_text("\u{201C}hola\u{201D}");
        assert_eq!(p.words, 1);
        assert_eq!(p.lengths[3], 1);
        assert_eq!(p.vowels_by_length[2][3], 1);
    }

    #[test]
    fn test_oversized_word_saturates_top_bucket() {
        let long = "x".repeat(MAX_WORD_LEN + 5);
        let p = process_text(&long);
        assert_eq!(p.words, 1);
        assert_eq!(p.lengths[MAX_WORD_LEN - 1], 1);
        assert_eq!(p.max_word_len, MAX_WORD_LEN + 5);
    }
}
