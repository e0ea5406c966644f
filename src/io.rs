//! Source and sink contracts (§6.1/§6.2).
//!
//! Both are synchronous, blocking, partial-read/partial-write friendly,
//! and caller-owned: the core never closes them and never retains a
//! reference past the [`crate::flow::flow`] call that borrowed them.

use std::io;

/// A blocking byte producer. Partial reads are expected; `Ok(0)` means
/// end-of-stream.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes, returning the number read, or `Ok(0)`
    /// at end-of-stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Blanket impl so any `std::io::Read` (files, `TcpStream`, `Stdin` locks,
/// in-memory cursors) satisfies the source contract directly.
impl<R: io::Read + ?Sized> ByteSource for R {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }
}

/// A blocking byte consumer. Writes may be partial; implementations loop
/// internally until the whole slice is written or an error occurs.
pub trait ByteSink {
    /// Write the entirety of `data`, looping over partial writes.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Blanket impl so any `std::io::Write` satisfies the sink contract
/// directly.
impl<W: io::Write + ?Sized> ByteSink for W {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        io::Write::write_all(self, data)
    }
}

/// Whether a write error represents benign downstream closure (broken
/// pipe, or a short write against an already-exhausted limit) rather than
/// a genuine failure. The flow controller recovers from these as clean
/// termination instead of surfacing [`crate::error::FlowError::SinkFailed`].
pub fn is_benign_sink_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WriteZero | io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_pipe_is_benign() {
        let err = io::Error::from(io::ErrorKind::BrokenPipe);
        assert!(is_benign_sink_error(&err));
    }

    #[test]
    fn other_errors_are_not_benign() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(!is_benign_sink_error(&err));
    }

    #[test]
    fn vec_u8_satisfies_sink_via_blanket_impl() {
        let mut sink: Vec<u8> = Vec::new();
        ByteSink::write_all(&mut sink, b"hello").unwrap();
        assert_eq!(sink, b"hello");
    }

    #[test]
    fn slice_cursor_satisfies_source_via_blanket_impl() {
        let mut cursor = io::Cursor::new(b"hello world".to_vec());
        let mut buf = [0u8; 5];
        let n = ByteSource::read(&mut cursor, &mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"hello");
    }
}
