//! Byte classification for the lexical pipeline
//!
//! The lexical chunker and the lexical kernel must segment text identically:
//! the chunker cuts units only after word separators, and the kernel re-derives
//! word boundaries inside each unit. Both drive the same `CharScanner`, so the
//! segmentation agrees by construction.
//!
//! The scanner folds multi-byte sequences into single logical characters:
//!
//! - `0xC3 ..` — Latin-1 supplement letters (accented vowels count as one
//!   character and one vowel)
//! - `0xC2 ..` — guillemets and broken bar, classified as separators
//! - `0xE2 0x80 ..` — curly quotes, dashes and ellipsis; curly apostrophes
//!   glue the surrounding sequences into one word
//!
//! Classification is table-driven: static lookup sets of byte classes rather
//! than per-character string comparisons, so the tables can be tested
//! exhaustively.

/// Class of one completed logical character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Ends the current word (whitespace, punctuation, quotes, dashes).
    Separator,
    /// Word character that is a vowel (plain or accented).
    Vowel,
    /// Word character that is not a vowel.
    Regular,
    /// Joins the surrounding sequences without contributing length
    /// (straight or curly apostrophe inside a contraction).
    Glue,
}

/// ASCII bytes that end a word.
const ASCII_SEPARATORS: &[u8] = &[
    b' ', b'\t', b'\n', b'\r', b'-', b'"', b'[', b']', b'{', b'}', b'(', b')',
    b'.', b',', b':', b';', b'?', b'!', b'`',
];

/// Second bytes of `0xC3`-prefixed accented vowels, lower-case form.
/// Upper-case variants map onto this set via `| 0x20`.
const ACCENTED_VOWELS: &[u8] = &[
    0xA0, 0xA1, 0xA2, 0xA3, // à á â ã
    0xA8, 0xA9, 0xAA, // è é ê
    0xAC, 0xAD, // ì í
    0xB2, 0xB3, 0xB4, 0xB5, // ò ó ô õ
    0xB9, 0xBA, 0xBC, // ù ú ü
];

/// Second bytes of `0xC2`-prefixed separators (« » ¦).
const C2_SEPARATORS: &[u8] = &[0xAB, 0xBB, 0xA6];

/// Third bytes of `0xE2 0x80`-prefixed separators: curly double quotes,
/// en/em dashes, ellipsis.
const E2_80_SEPARATORS: &[u8] = &[0x9C, 0x9D, 0x93, 0x94, 0xA6];

/// Third bytes of `0xE2 0x80`-prefixed glue characters (curly apostrophes).
const E2_80_GLUE: &[u8] = &[0x98, 0x99];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Not inside a multi-byte sequence.
    Start,
    /// Seen `0xC3`, awaiting the accented-letter byte.
    AfterC3,
    /// Seen `0xC2`, awaiting the punctuation byte.
    AfterC2,
    /// Seen `0xE2`, awaiting `0x80`.
    AfterE2,
    /// Seen `0xE2 0x80`, awaiting the final punctuation byte.
    AfterE280,
    /// Seen `0xE2` followed by something other than `0x80`; one
    /// continuation byte remains in the sequence.
    SkipOne,
}

/// Incremental scanner that turns a byte stream into logical characters.
///
/// Feed bytes one at a time with [`push`](Self::push); a `Some(class)` return
/// means a logical character just completed, `None` means the byte was the
/// prefix of a multi-byte sequence. The scanner is back at its initial state
/// whenever a character completes, which is what lets the chunker cut a unit
/// immediately after any completed separator.
#[derive(Debug, Clone)]
pub struct CharScanner {
    state: State,
}

impl CharScanner {
    pub fn new() -> Self {
        Self { state: State::Start }
    }

    /// True when the scanner is not mid-sequence.
    pub fn at_boundary(&self) -> bool {
        self.state == State::Start
    }

    /// Consume one byte; returns the class of the logical character it
    /// completed, if any.
    pub fn push(&mut self, byte: u8) -> Option<CharClass> {
        match self.state {
            State::Start => match byte {
                0xC3 => {
                    self.state = State::AfterC3;
                    None
                }
                0xC2 => {
                    self.state = State::AfterC2;
                    None
                }
                0xE2 => {
                    self.state = State::AfterE2;
                    None
                }
                b'\'' => Some(CharClass::Glue),
                b => {
                    let lower = b.to_ascii_lowercase();
                    if ASCII_SEPARATORS.contains(&b) {
                        Some(CharClass::Separator)
                    } else if matches!(lower, b'a' | b'e' | b'i' | b'o' | b'u') {
                        Some(CharClass::Vowel)
                    } else {
                        Some(CharClass::Regular)
                    }
                }
            },
            State::AfterC3 => {
                self.state = State::Start;
                // Upper-case accented letters sit 0x20 below their
                // lower-case forms, same as ASCII.
                if ACCENTED_VOWELS.contains(&(byte | 0x20)) {
                    Some(CharClass::Vowel)
                } else {
                    Some(CharClass::Regular)
                }
            }
            State::AfterC2 => {
                self.state = State::Start;
                if C2_SEPARATORS.contains(&byte) {
                    Some(CharClass::Separator)
                } else {
                    Some(CharClass::Regular)
                }
            }
            State::AfterE2 => {
                if byte == 0x80 {
                    self.state = State::AfterE280;
                    None
                } else {
                    self.state = State::SkipOne;
                    None
                }
            }
            State::AfterE280 => {
                self.state = State::Start;
                if E2_80_GLUE.contains(&byte) {
                    Some(CharClass::Glue)
                } else if E2_80_SEPARATORS.contains(&byte) {
                    Some(CharClass::Separator)
                } else {
                    Some(CharClass::Regular)
                }
            }
            State::SkipOne => {
                self.state = State::Start;
                Some(CharClass::Regular)
            }
        }
    }
}

impl Default for CharScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_str(s: &str) -> Vec<CharClass> {
        let mut scanner = CharScanner::new();
        s.bytes().filter_map(|b| scanner.push(b)).collect()
    }

    #[test]
    fn test_ascii_classes() {
        assert_eq!(classify_str("a"), vec![CharClass::Vowel]);
        assert_eq!(classify_str("Z"), vec![CharClass::Regular]);
        assert_eq!(classify_str(" "), vec![CharClass::Separator]);
        assert_eq!(classify_str("'"), vec![CharClass::Glue]);
    }

    #[test]
    fn test_ascii_vowels_case_insensitive() {
        for c in ["A", "E", "I", "O", "U", "a", "e", "i", "o", "u"] {
            assert_eq!(classify_str(c), vec![CharClass::Vowel], "vowel {c}");
        }
    }

    #[test]
    fn test_separator_table() {
        for c in [
            " ", "\t", "\n", "-", "\"", "[", "]", "{", "}", "(", ")", ".",
            ",", ":", ";", "?", "!", "`",
        ] {
            assert_eq!(classify_str(c), vec![CharClass::Separator], "sep {c:?}");
        }
    }

    #[test]
    fn test_accented_vowel_is_one_logical_char() {
        // "é" is 0xC3 0xA9: prefix yields nothing, second byte completes.
        let mut scanner = CharScanner::new();
        assert_eq!(scanner.push(0xC3), None);
        assert!(!scanner.at_boundary());
        assert_eq!(scanner.push(0xA9), Some(CharClass::Vowel));
        assert!(scanner.at_boundary());
    }

    #[test]
    fn test_uppercase_accented_vowel() {
        // "É" is 0xC3 0x89.
        assert_eq!(classify_str("É"), vec![CharClass::Vowel]);
        // "Ç" is 0xC3 0x87 — accented but not a vowel.
        assert_eq!(classify_str("Ç"), vec![CharClass::Regular]);
    }

    #[test]
    fn test_curly_apostrophe_is_glue() {
        // U+2019 RIGHT SINGLE QUOTATION MARK = 0xE2 0x80 0x99
        assert_eq!(classify_str("\u{2019}"), vec![CharClass::Glue]);
        assert_eq!(classify_str("\u{2018}"), vec![CharClass::Glue]);
    }

    #[test]
    fn test_curly_quotes_and_dashes_separate() {
        for s in ["\u{201C}", "\u{201D}", "\u{2013}", "\u{2014}", "\u{2026}"] {
            assert_eq!(classify_str(s), vec![CharClass::Separator], "sep {s:?}");
        }
    }

    #[test]
    fn test_guillemets_separate() {
        assert_eq!(classify_str("«"), vec![CharClass::Separator]);
        assert_eq!(classify_str("»"), vec![CharClass::Separator]);
    }

    #[test]
    fn test_multibyte_never_false_boundary() {
        // No byte inside "é«”" may complete a character while the scanner
        // reports being mid-sequence.
        let mut scanner = CharScanner::new();
        for b in "é«\u{201D}".bytes() {
            if scanner.push(b).is_some() {
                assert!(scanner.at_boundary());
            }
        }
    }
}
