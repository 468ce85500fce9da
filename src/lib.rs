//! workpulse - bounded master-worker compute framework
//!
//! A dispatcher partitions input sources into fixed-capacity work units,
//! hands each unit to one of a fixed pool of workers over a synchronous
//! request/response channel, and folds every returned partial result into a
//! per-source accumulator.
//!
//! # Architecture
//!
//! - **Chunker**: lazy, finite work-unit production with kernel-specific
//!   boundary rules
//! - **Dispatcher**: round-robin assignment, strict send-then-receive per
//!   worker, stop broadcast on exhaustion
//! - **Worker pool**: stateless threads bound to one pure compute kernel
//! - **Kernels**: lexical word/vowel histograms, circular cross-correlation
//! - **Accumulator**: sole owner of per-source global state, order-independent
//!   merges, final report derivation

pub mod accumulator;
pub mod chunker;
pub mod config;
pub mod dispatcher;
pub mod kernel;
pub mod output;
pub mod protocol;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use kernel::Kernel;

/// Result type used throughout workpulse
pub type Result<T> = anyhow::Result<T>;
