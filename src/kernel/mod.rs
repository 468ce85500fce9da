//! Compute kernel abstraction
//!
//! A kernel is the pure function at the heart of the pipeline: it maps one
//! bounded work unit to one partial result, with no side effects and no state
//! carried between invocations. Workers are agnostic to the concrete kernel;
//! the trait is the seam that lets the same dispatch skeleton drive both the
//! lexical histogram and the signal correlation.

pub mod charclass;
pub mod correlation;
pub mod lexical;

pub use charclass::{CharClass, CharScanner};
pub use correlation::CorrelationKernel;
pub use lexical::LexicalKernel;

/// Pure compute function applied to each work unit.
///
/// # Thread Safety
///
/// Kernels are shared across the worker pool behind an `Arc`, so they must be
/// `Send + Sync`. Because `process` takes `&self` and units own their data,
/// workers need no synchronization beyond the channel handoff.
pub trait Kernel: Send + Sync + 'static {
    /// Request type: one bounded slice of input.
    type Unit: Send + 'static;
    /// Response type: partial aggregates for that slice.
    type Partial: Send + 'static;

    /// Compute the partial result for one unit.
    fn process(&self, unit: &Self::Unit) -> Self::Partial;
}
