//! Work-unit production
//!
//! A chunker turns one or more input sources into a lazy, finite sequence of
//! bounded work units. The sequence is not restartable: state advances
//! irreversibly as each source is consumed, and `Ok(None)` signals that every
//! source has been fully consumed.
//!
//! Boundary rules are kernel-specific: the lexical chunker cuts only after
//! word separators, the correlation chunker batches consecutive lag indices
//! and pads the final unit of a source with sentinels.

pub mod correlation;
pub mod lexical;

pub use correlation::{CorrelationChunker, SignalFile};
pub use lexical::LexicalChunker;

use crate::Result;

/// Finite, non-restartable work-unit sequence.
pub trait Chunker {
    type Unit;

    /// Produce the next unit, or `Ok(None)` once every source is exhausted.
    fn next_unit(&mut self) -> Result<Option<Self::Unit>>;
}
