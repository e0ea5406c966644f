//! Error taxonomy for the flow pipeline.
//!
//! Mirrors the kinds, not the types, in the core's error-handling design:
//! each variant corresponds to exactly one row of the error table and
//! carries just enough context to log or display. `DownstreamClosed` is
//! deliberately absent — it is recovered internally as clean termination
//! and never escapes `flow()` as a `FlowError`.

use std::io;

/// Errors `flow()` can return.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A read from the source failed with something other than EOF.
    #[error("source read failed: {0}")]
    SourceFailed(#[source] io::Error),

    /// The caller-supplied renderer returned an error.
    #[error("render failed: {0}")]
    RenderFailed(String),

    /// A write to the sink failed with something other than a benign
    /// closed-downstream condition.
    #[error("sink write failed: {0}")]
    SinkFailed(#[source] io::Error),

    /// The cancellation token was tripped before the run completed.
    #[error("cancelled")]
    Cancelled,

    /// The accumulator could not stay within `MAX_BUF` even after forced
    /// flushing and truncation.
    #[error("resource exhausted: could not bound accumulator to {limit} bytes")]
    ResourceExhausted {
        /// The configured hard ceiling that could not be honored.
        limit: usize,
    },
}
