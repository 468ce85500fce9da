//! Result aggregation
//!
//! The accumulator is the sole owner of all per-source global state. The
//! dispatcher feeds it partial results in completion order — round-robin
//! completion order, not chunk order — so every merge must be commutative and
//! associative: the finalized report is identical for any permutation of the
//! same partials.
//!
//! State for a source lives in a map keyed by source id, created the first
//! time a partial for that source arrives, and is never touched outside this
//! module.

pub mod correlation;
pub mod lexical;

pub use correlation::{CorrelationAccumulator, CorrelationReport};
pub use lexical::{LexicalAccumulator, LexicalReport};

use crate::Result;

/// Owner and merger of per-source global results.
pub trait Accumulator {
    /// Partial result type fed in by the dispatcher.
    type Partial;
    /// Finalized report type.
    type Report;

    /// Fold one partial result into the global state for its source.
    fn merge(&mut self, partial: Self::Partial) -> Result<()>;

    /// Derive the final report from the accumulated state.
    fn finalize(self) -> Result<Self::Report>;
}
