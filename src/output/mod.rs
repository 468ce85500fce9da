//! Report rendering
//!
//! Console output for finalized reports and dispatch summaries.

pub mod text;
