//! Configuration types for the flow pipeline.
//!
//! `FlowConfig` is created by the caller and immutable for the duration
//! of a run, mirroring the teacher's `PrettifierConfig` (built once,
//! handed to the pipeline, never mutated from inside).

/// Hard ceiling on accumulator size, regardless of the configured window.
pub const DEFAULT_MAX_BUF: usize = 16 * 1024 * 1024;

/// Size of the temporary buffer used for each read from the source.
pub const READ_CHUNK_SIZE: usize = 4 * 1024;

/// The caller's requested soft upper bound on accumulated bytes between
/// flushes, as a closed enum rather than the raw signed integer the
/// language-independent design describes at the wire/CLI level.
///
/// `-1` maps to [`Window::Unbuffered`], `0` to [`Window::Buffered`], and
/// any positive value to [`Window::Windowed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Flush at every safe boundary; minimizes latency.
    Unbuffered,
    /// No intermediate flush; render and emit only at EOF.
    Buffered,
    /// Force a flush once accumulation reaches roughly this many bytes.
    Windowed(usize),
}

/// Error converting a raw integer into a [`Window`].
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("invalid window value {0}: must be -1, 0, or positive")]
pub struct InvalidWindow(pub i64);

impl TryFrom<i64> for Window {
    type Error = InvalidWindow;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Window::Unbuffered),
            0 => Ok(Window::Buffered),
            n if n > 0 => Ok(Window::Windowed(n as usize)),
            other => Err(InvalidWindow(other)),
        }
    }
}

impl From<Window> for i64 {
    fn from(window: Window) -> Self {
        match window {
            Window::Unbuffered => -1,
            Window::Buffered => 0,
            Window::Windowed(n) => n as i64,
        }
    }
}

/// Immutable configuration for one [`crate::flow::flow`] call.
#[derive(Debug, Clone, Copy)]
pub struct FlowConfig {
    /// Flush cadence.
    pub window: Window,
    /// Hard ceiling on accumulator size, independent of `window`.
    pub max_buf: usize,
}

impl FlowConfig {
    /// A config with the given window and the default `MAX_BUF`.
    pub fn new(window: Window) -> Self {
        Self {
            window,
            max_buf: DEFAULT_MAX_BUF,
        }
    }

    /// Override `MAX_BUF`. Primarily useful for tests exercising the
    /// resource-exhaustion path without allocating 16 MiB.
    pub fn with_max_buf(mut self, max_buf: usize) -> Self {
        self.max_buf = max_buf;
        self
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::new(Window::Buffered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_from_raw_integers() {
        assert_eq!(Window::try_from(-1).unwrap(), Window::Unbuffered);
        assert_eq!(Window::try_from(0).unwrap(), Window::Buffered);
        assert_eq!(Window::try_from(8192).unwrap(), Window::Windowed(8192));
    }

    #[test]
    fn window_rejects_other_negatives() {
        assert!(Window::try_from(-2).is_err());
    }

    #[test]
    fn window_round_trips_to_i64() {
        assert_eq!(i64::from(Window::Unbuffered), -1);
        assert_eq!(i64::from(Window::Buffered), 0);
        assert_eq!(i64::from(Window::Windowed(42)), 42);
    }
}
