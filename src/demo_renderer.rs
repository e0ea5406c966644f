//! Bundled demo renderer for the `flowdown` CLI binary.
//!
//! This is explicitly NOT a production markdown-to-ANSI formatter. It
//! exists only so the CLI harness is runnable end-to-end without an
//! external rendering dependency: it strips the most common inline
//! markers (`**bold**`, `*italic*`, leading `#` heading markers) and
//! passes everything else through unchanged. A real caller is expected
//! to supply its own [`crate::render::Render`] implementation.

use std::borrow::Cow;

use crate::render::{Render, RenderError};

/// Minimal bold/italic/heading-marker stripper. Byte-oriented like the
/// rest of the crate; operates line by line so it never needs to look
/// past a single `\n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoRenderer;

impl Render for DemoRenderer {
    fn render<'a>(&self, input: &'a [u8]) -> Result<Cow<'a, [u8]>, RenderError> {
        if !needs_stripping(input) {
            return Ok(Cow::Borrowed(input));
        }

        let mut out = Vec::with_capacity(input.len());
        for line in input.split_inclusive(|&b| b == b'\n') {
            strip_line(line, &mut out);
        }
        Ok(Cow::Owned(out))
    }
}

fn needs_stripping(input: &[u8]) -> bool {
    input
        .iter()
        .any(|&b| b == b'*' || b == b'#')
}

fn strip_line(line: &[u8], out: &mut Vec<u8>) {
    let (has_newline, body) = match line.strip_suffix(b"\n") {
        Some(body) => (true, body),
        None => (false, line),
    };

    let mut rest = strip_leading_heading_markers(body);
    while !rest.is_empty() {
        match rest[0] {
            b'*' => rest = &rest[1..],
            _ => {
                out.push(rest[0]);
                rest = &rest[1..];
            }
        }
    }
    if has_newline {
        out.push(b'\n');
    }
}

/// Strip a leading run of `#` markers and the single space that follows
/// an ATX heading marker, e.g. `"## Title"` -> `"Title"`.
fn strip_leading_heading_markers(body: &[u8]) -> &[u8] {
    let hashes = body.iter().take_while(|&&b| b == b'#').count();
    if hashes == 0 || hashes == body.len() {
        return body;
    }
    let rest = &body[hashes..];
    rest.strip_prefix(b" ").unwrap_or(rest)
}
