//! Boundary detector.
//!
//! Given the accumulated buffer and the fence/structure tracker, finds the
//! largest safe offset at which the input may be split without placing
//! any protected region (open fence, open frontmatter, open table) across
//! the cut, in amortized O(new bytes since the previous call): the
//! detector caches the offset it last scanned to and the tracker state at
//! that offset, and only classifies the lines that arrived since.

use crate::config::Window;
use crate::fence::FenceState;

/// Small-buffer protection floor: in windowed mode, a candidate chunk
/// smaller than this is not flushed yet (wait for more data), to avoid
/// handing the renderer pathological tiny fragments.
pub const MIN_CHUNK: usize = 16;

/// A recorded cut candidate. Scanning stops the instant a blank-line
/// candidate is recorded — it is not merely preferred over a single-line
/// one, it ends the scan for this call, leaving any later lines
/// unclassified until the next call. This is what lets a single large
/// read containing several blank-separated paragraphs still surface one
/// paragraph boundary at a time as the accumulator is drained, rather
/// than jumping straight to the last blank line available. A single-line
/// candidate, by contrast, keeps advancing to the latest one seen as
/// long as no blank line has appeared yet in this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lock {
    Single(usize),
    Blank(usize),
}

impl Lock {
    fn offset(self) -> usize {
        match self {
            Lock::Single(o) | Lock::Blank(o) => o,
        }
    }
}

/// Outcome of a boundary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryOutcome {
    /// A clean cut point at or above [`MIN_CHUNK`], ready to emit.
    Clean(usize),
    /// A clean cut point exists but is smaller than [`MIN_CHUNK`]; the
    /// caller may still choose to emit it (e.g. once a window target has
    /// been reached and waiting longer serves no purpose).
    Suppressed(usize),
    /// No clean cut point exists anywhere in the scanned region: every
    /// complete line scanned so far still leaves the tracker inside
    /// protected content.
    None,
}

/// Detects safe split points in a growing byte buffer.
#[derive(Debug, Default)]
pub struct BoundaryDetector {
    tracker: FenceState,
    /// Offset, relative to the accumulator's current pending region, up to
    /// which lines have already been classified.
    scanned_to: usize,
    /// Best candidate found within the scanned region since the last
    /// flush, if any.
    best: Option<Lock>,
}

impl BoundaryDetector {
    /// Create a fresh detector, as at the start of a document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of the underlying fence stack (diagnostic / test use).
    pub fn fence_depth(&self) -> usize {
        self.tracker.fence_depth()
    }

    /// Scan newly available complete lines in `pending`, updating the
    /// cached tracker state and best candidate, stopping as soon as a
    /// blank-line candidate is recorded (see [`Lock`]). Leaves everything
    /// from that point on — including a trailing partial line with no
    /// terminating LF yet — unclassified until the next call.
    fn scan(&mut self, pending: &[u8]) {
        let mut pos = self.scanned_to;
        loop {
            if matches!(self.best, Some(Lock::Blank(_))) {
                break;
            }
            let Some(rel) = pending[pos..].iter().position(|&b| b == b'\n') else {
                break;
            };
            let line = &pending[pos..pos + rel];
            let line_end = pos + rel + 1;
            let was_blank = line.is_empty();

            self.tracker.classify_line(line);

            if self.tracker.is_clean() {
                self.best = Some(if was_blank {
                    Lock::Blank(line_end)
                } else {
                    Lock::Single(line_end)
                });
            }

            pos = line_end;
        }
        self.scanned_to = pos;
    }

    /// Scan and return the raw best candidate offset, if any, ignoring the
    /// small-chunk floor entirely. Used by the flow controller when a
    /// forced flush is being considered, to prefer an already-clean cut
    /// over one that actually crosses protected content.
    pub(crate) fn clean_offset(&mut self, pending: &[u8]) -> Option<usize> {
        self.scan(pending);
        self.best.map(Lock::offset)
    }

    /// Find the best cut point in `pending`, applying the small-chunk
    /// floor in windowed mode.
    pub fn find_safe_boundary(&mut self, pending: &[u8], window: Window) -> BoundaryOutcome {
        let Some(offset) = self.clean_offset(pending) else {
            return BoundaryOutcome::None;
        };

        if let Window::Windowed(_) = window {
            if offset < MIN_CHUNK {
                log::trace!(
                    "boundary: candidate chunk ({offset} < {MIN_CHUNK}) is below the small-chunk floor"
                );
                return BoundaryOutcome::Suppressed(offset);
            }
        }

        BoundaryOutcome::Clean(offset)
    }

    /// Find a cut point for a forced flush, for use only once no clean
    /// boundary exists at all: the first LF at or after `target`, falling
    /// back to the last LF before it, falling back to `pending.len()` if
    /// `pending` has no LF whatsoever. Cuts near the configured target
    /// rather than consuming the whole buffer, so a long run of protected
    /// content (e.g. an unclosed fence) is force-flushed progressively
    /// instead of in one unbounded chunk.
    pub fn force_boundary(&self, pending: &[u8], target: usize) -> usize {
        let clamped = target.min(pending.len());

        if let Some(rel) = pending[clamped..].iter().position(|&b| b == b'\n') {
            return clamped + rel + 1;
        }
        if let Some(rel) = pending[..clamped].iter().rposition(|&b| b == b'\n') {
            return rel + 1;
        }
        pending.len()
    }

    /// Notify the detector that `n` bytes were flushed from the front of
    /// the pending region. Shifts the cached scan position and, if the
    /// best candidate still lies ahead of the new origin, shifts it too
    /// rather than discarding it — the candidate's line was already
    /// classified and re-scanning it would double-count it against the
    /// tracker. A candidate at or behind the new origin is stale (it was
    /// at or before the consumed prefix) and is cleared so the next scan
    /// rediscovers whatever comes after it.
    pub fn advance(&mut self, n: usize) {
        self.scanned_to = self.scanned_to.saturating_sub(n);
        self.best = self.best.and_then(|lock| {
            let shifted = lock.offset().checked_sub(n)?;
            if shifted == 0 {
                None
            } else {
                Some(match lock {
                    Lock::Single(_) => Lock::Single(shifted),
                    Lock::Blank(_) => Lock::Blank(shifted),
                })
            }
        });
    }

    /// Reset to the state of a fresh document (used when the caller wants
    /// to discard in-flight accumulation entirely).
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_boundary_without_any_lf() {
        let mut det = BoundaryDetector::new();
        assert_eq!(
            det.find_safe_boundary(b"no newline yet", Window::Buffered),
            BoundaryOutcome::None
        );
    }

    #[test]
    fn single_line_boundary_outside_protected_content() {
        let mut det = BoundaryDetector::new();
        let off = det.find_safe_boundary(b"hello\nworld", Window::Unbuffered);
        assert_eq!(off, BoundaryOutcome::Clean(6));
    }

    #[test]
    fn blank_line_boundary_preferred_over_single_line() {
        let mut det = BoundaryDetector::new();
        // "hello\n" is a single-line candidate at 6; "\n" (blank) wins at 7.
        let off = det.find_safe_boundary(b"hello\n\nworld", Window::Unbuffered);
        assert_eq!(off, BoundaryOutcome::Clean(7));
    }

    #[test]
    fn no_boundary_inside_open_fence() {
        let mut det = BoundaryDetector::new();
        let off = det.find_safe_boundary(b"```\nfoo\nbar\n", Window::Unbuffered);
        assert_eq!(off, BoundaryOutcome::None);
        assert_eq!(det.fence_depth(), 1);
    }

    #[test]
    fn boundary_found_after_fence_closes() {
        let mut det = BoundaryDetector::new();
        let off = det.find_safe_boundary(b"```\nfoo\n```\nafter\n", Window::Unbuffered);
        // The fence closes at offset 12; "after\n" is a clean, non-blank
        // line with nothing protected following it, so with no blank line
        // anywhere in the input the single-line candidate keeps advancing
        // all the way to the end of the buffer.
        assert_eq!(off, BoundaryOutcome::Clean(18));
    }

    #[test]
    fn windowed_mode_suppresses_tiny_chunks() {
        let mut det = BoundaryDetector::new();
        // "a\n" is a clean single-line boundary at offset 2, below MIN_CHUNK.
        assert_eq!(
            det.find_safe_boundary(b"a\n", Window::Windowed(4)),
            BoundaryOutcome::Suppressed(2),
            "tiny chunk should be suppressed, not absent, in windowed mode"
        );
        // Unbuffered mode has no such floor.
        let mut det2 = BoundaryDetector::new();
        assert_eq!(
            det2.find_safe_boundary(b"a\n", Window::Unbuffered),
            BoundaryOutcome::Clean(2)
        );
    }

    #[test]
    fn advance_shifts_scan_origin_and_shifts_best() {
        let mut det = BoundaryDetector::new();
        let pending = b"one\ntwo\n";
        assert_eq!(
            det.find_safe_boundary(pending, Window::Unbuffered),
            BoundaryOutcome::Clean(8)
        );
        // Only 4 bytes are actually consumed (less than the 8-byte best
        // found above) — the remaining candidate must shift to 4, not be
        // forgotten, since its line was already classified.
        det.advance(4);
        let remaining = &pending[4..];
        assert_eq!(
            det.find_safe_boundary(remaining, Window::Unbuffered),
            BoundaryOutcome::Clean(4)
        );
    }

    #[test]
    fn advance_past_the_best_candidate_clears_it() {
        let mut det = BoundaryDetector::new();
        let pending = b"one\ntwo\n";
        assert_eq!(
            det.find_safe_boundary(pending, Window::Unbuffered),
            BoundaryOutcome::Clean(8)
        );
        det.advance(8);
        assert_eq!(
            det.find_safe_boundary(b"", Window::Unbuffered),
            BoundaryOutcome::None
        );
    }

    #[test]
    fn force_boundary_cuts_near_target_not_at_buffer_end() {
        let det = BoundaryDetector::new();
        let pending: &[u8] = b"```\nx\ny\nz\n";
        assert_eq!(det.force_boundary(pending, 5), 6);
        assert_eq!(det.force_boundary(pending, 0), 4);
    }

    #[test]
    fn force_boundary_falls_back_to_last_lf_before_target_when_none_follows() {
        let det = BoundaryDetector::new();
        let pending: &[u8] = b"abc\ndef";
        assert_eq!(det.force_boundary(pending, 10), 4);
    }

    #[test]
    fn force_boundary_falls_back_to_buffer_end() {
        let det = BoundaryDetector::new();
        assert_eq!(det.force_boundary(b"no newline at all", 100), 17);
    }
}
