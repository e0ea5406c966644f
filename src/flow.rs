//! Flow controller.
//!
//! The top-level loop: reads from the source, drives the fence tracker
//! and boundary detector, decides when to flush (progressive, buffered,
//! or windowed), writes to the sink, and translates benign sink errors
//! into clean termination. Single-threaded and cooperative — the only
//! suspension points are source reads, sink writes, and renderer calls,
//! each preceded/followed by a cancellation check per [`CancellationToken`].

use crate::accumulator::Accumulator;
use crate::boundary::{BoundaryDetector, BoundaryOutcome};
use crate::cancel::CancellationToken;
use crate::config::{FlowConfig, Window, READ_CHUNK_SIZE};
use crate::error::FlowError;
use crate::io::{is_benign_sink_error, ByteSink, ByteSource};
use crate::render::{render_and_prepare, Render};

/// Named states of the flow controller, used only for trace logging — the
/// control flow itself is an ordinary Rust loop, not a dispatched state
/// machine, since the whole run lives on one stack with no yielding
/// across states other than the named suspension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Reading,
    Rendering,
    Writing,
    Draining,
    Done,
}

/// Whether the sink signalled that it wants no more data.
enum WriteOutcome {
    Wrote,
    DownstreamClosed,
}

/// Drive `render` over `source`, writing results to `sink`, honoring
/// `config` and `cancel`. This is the core's entry point (§6.4).
///
/// Ordering guarantees: writes are strictly in input order; exactly one
/// renderer call happens per emitted chunk; at most one forced flush
/// happens per boundary-failure event.
pub fn flow(
    cancel: &CancellationToken,
    source: &mut dyn ByteSource,
    sink: &mut dyn ByteSink,
    config: FlowConfig,
    render: &dyn Render,
) -> Result<(), FlowError> {
    let mut acc = Accumulator::new(config.max_buf);
    let mut boundary = BoundaryDetector::new();
    let mut read_buf = vec![0u8; READ_CHUNK_SIZE];
    let mut saw_any_input = false;

    loop {
        cancel.check()?;

        let state = FlowState::Reading;
        log::trace!("flow: {state:?}");
        let n = source
            .read(&mut read_buf)
            .map_err(FlowError::SourceFailed)?;

        cancel.check()?;

        if n == 0 {
            break; // EOF
        }
        saw_any_input = true;

        if append_with_overflow_handling(&mut acc, &mut boundary, cancel, render, sink, &read_buf[..n])?
            .is_closed()
        {
            return Ok(());
        }

        if flush_available_boundaries(&mut acc, &mut boundary, cancel, render, sink, config.window)?
            .is_closed()
        {
            return Ok(());
        }
    }

    drain(&mut acc, cancel, render, sink, saw_any_input)
}

/// Outcome of attempting to continue the read loop after a write.
enum Continue {
    Keep,
    Stop,
}

impl Continue {
    fn is_closed(&self) -> bool {
        matches!(self, Continue::Stop)
    }
}

/// Append `data` to the accumulator, making room via a forced flush (and,
/// failing that, truncation) if it would otherwise exceed `MAX_BUF`.
fn append_with_overflow_handling(
    acc: &mut Accumulator,
    boundary: &mut BoundaryDetector,
    cancel: &CancellationToken,
    render: &dyn Render,
    sink: &mut dyn ByteSink,
    data: &[u8],
) -> Result<Continue, FlowError> {
    if acc.append(data).is_ok() {
        return Ok(Continue::Keep);
    }

    log::debug!("flow: accumulator would exceed MAX_BUF, forcing a flush to make room");
    let target = acc.max_buf();
    if force_flush_one(acc, boundary, cancel, render, sink, target)?.is_closed() {
        return Ok(Continue::Stop);
    }

    if acc.append(data).is_ok() {
        return Ok(Continue::Keep);
    }

    // Even an empty accumulator can't hold this read: the read itself is
    // larger than MAX_BUF. Truncate it to fit rather than fail, per the
    // documented recovery policy ("do not fail").
    let room = acc.max_buf().saturating_sub(acc.len());
    if room == 0 {
        return Err(FlowError::ResourceExhausted {
            limit: acc.max_buf(),
        });
    }
    log::warn!(
        "flow: single read of {} bytes exceeds MAX_BUF ({}), truncating to {} bytes",
        data.len(),
        acc.max_buf(),
        room
    );
    acc.append(&data[..room])
        .expect("slice was sized to fit by construction");
    Ok(Continue::Keep)
}

/// Drain every safe boundary currently available, emitting a chunk for
/// each. In buffered mode (`window == 0`), this is a no-op: nothing is
/// flushed until EOF.
///
/// A windowed target being reached only ever bypasses the small-chunk
/// floor (`Suppressed`) or triggers a true forced flush (`None`) — never
/// both at once, and never when a clean boundary is simply waiting for
/// more data with the target not yet reached. This is what keeps a
/// forced, protected-content-crossing cut reserved for the case §4.E
/// actually describes: the tracker is genuinely stuck, not merely
/// holding back a small-but-clean chunk.
fn flush_available_boundaries(
    acc: &mut Accumulator,
    boundary: &mut BoundaryDetector,
    cancel: &CancellationToken,
    render: &dyn Render,
    sink: &mut dyn ByteSink,
    window: Window,
) -> Result<Continue, FlowError> {
    if matches!(window, Window::Buffered) {
        return Ok(Continue::Keep);
    }

    loop {
        let target = match window {
            Window::Windowed(target) => Some(target),
            _ => None,
        };
        let reached_target = target.is_some_and(|t| acc.pending().len() >= t);

        match boundary.find_safe_boundary(acc.pending(), window) {
            BoundaryOutcome::Clean(off) => {
                if emit_chunk(acc, boundary, cancel, render, sink, off, false)?.is_closed() {
                    return Ok(Continue::Stop);
                }
            }
            BoundaryOutcome::Suppressed(off) if reached_target => {
                log::debug!(
                    "flow: window target reached, bypassing the small-chunk floor for a clean cut at {off}"
                );
                if emit_chunk(acc, boundary, cancel, render, sink, off, false)?.is_closed() {
                    return Ok(Continue::Stop);
                }
            }
            BoundaryOutcome::None if reached_target => {
                let target = target.expect("reached_target is only set under Window::Windowed");
                log::debug!(
                    "flow: window of {target} bytes exceeded with no clean boundary, forcing a flush"
                );
                return force_flush_one(acc, boundary, cancel, render, sink, target);
            }
            BoundaryOutcome::Suppressed(_) | BoundaryOutcome::None => {
                return Ok(Continue::Keep);
            }
        }
    }
}

/// Force a single flush to make room or bound memory. Prefers an
/// already-clean cut point over one that actually crosses protected
/// content — the latter is only used when the tracker is genuinely stuck
/// (e.g. an unclosed fence), per §4.E. Does nothing if the accumulator is
/// already empty.
fn force_flush_one(
    acc: &mut Accumulator,
    boundary: &mut BoundaryDetector,
    cancel: &CancellationToken,
    render: &dyn Render,
    sink: &mut dyn ByteSink,
    target: usize,
) -> Result<Continue, FlowError> {
    let pending = acc.pending();
    if pending.is_empty() {
        return Ok(Continue::Keep);
    }

    if let Some(cut) = boundary.clean_offset(pending) {
        return emit_chunk(acc, boundary, cancel, render, sink, cut, false);
    }

    let cut = boundary.force_boundary(pending, target);
    if cut == 0 {
        return Ok(Continue::Keep);
    }
    emit_chunk(acc, boundary, cancel, render, sink, cut, true)
}

/// Render and write the first `cut` bytes of the pending region, then
/// consume them from both the accumulator and the boundary detector.
fn emit_chunk(
    acc: &mut Accumulator,
    boundary: &mut BoundaryDetector,
    cancel: &CancellationToken,
    render: &dyn Render,
    sink: &mut dyn ByteSink,
    cut: usize,
    forced: bool,
) -> Result<Continue, FlowError> {
    cancel.check()?;

    log::trace!("flow: {:?}", FlowState::Rendering);
    let chunk = acc.pending()[..cut].to_vec();
    let output = render_and_prepare(render, &chunk, forced)?;
    cancel.check()?;

    log::trace!("flow: {:?}", FlowState::Writing);
    let outcome = write_chunk(sink, &output)?;

    acc.consume(cut);
    boundary.advance(cut);

    Ok(match outcome {
        WriteOutcome::Wrote => Continue::Keep,
        WriteOutcome::DownstreamClosed => Continue::Stop,
    })
}

/// Write `data` to `sink`, translating a benign closed-downstream error
/// into [`WriteOutcome::DownstreamClosed`] rather than an error.
fn write_chunk(sink: &mut dyn ByteSink, data: &[u8]) -> Result<WriteOutcome, FlowError> {
    match sink.write_all(data) {
        Ok(()) => Ok(WriteOutcome::Wrote),
        Err(e) if is_benign_sink_error(&e) => {
            log::debug!("flow: sink closed downstream, terminating cleanly");
            Ok(WriteOutcome::DownstreamClosed)
        }
        Err(e) => Err(FlowError::SinkFailed(e)),
    }
}

/// EOF reached: render and write whatever remains, regardless of boundary
/// rules — EOF is itself a boundary.
///
/// If every byte read has already been flushed out by a prior boundary
/// emission, the remainder is empty and there is nothing left to drain: a
/// real chunk already carried its own EOF-normalized trailing LF when it
/// was emitted, so rendering an empty remainder here would only add a
/// spurious extra one. The one case that *must* still render an empty
/// remainder is a truly empty input (`saw_any_input == false`), where
/// EOF-normalization is the only source of the single trailing newline an
/// empty document is expected to produce.
fn drain(
    acc: &mut Accumulator,
    cancel: &CancellationToken,
    render: &dyn Render,
    sink: &mut dyn ByteSink,
    saw_any_input: bool,
) -> Result<(), FlowError> {
    log::trace!("flow: {:?}", FlowState::Draining);
    cancel.check()?;

    let remainder = acc.pending().to_vec();
    if remainder.is_empty() && saw_any_input {
        log::trace!("flow: {:?}", FlowState::Done);
        return Ok(());
    }
    let output = render_and_prepare(render, &remainder, false)?;

    if let WriteOutcome::DownstreamClosed = write_chunk(sink, &output)? {
        log::trace!("flow: {:?}", FlowState::Done);
        return Ok(());
    }

    acc.consume(remainder.len());
    log::trace!("flow: {:?}", FlowState::Done);
    Ok(())
}
