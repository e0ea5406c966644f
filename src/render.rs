//! Renderer invoker.
//!
//! Wraps the caller-supplied byte→byte render function: normalizes
//! trailing newlines before calling it, forwards its errors wrapped as
//! [`crate::error::FlowError::RenderFailed`], and reconciles an isolated
//! reference-link artifact the downstream renderer has been observed to
//! produce at forced-flush boundaries.

use std::borrow::Cow;

use crate::error::FlowError;

/// Error returned by a caller-supplied renderer.
///
/// Scoped down from the teacher's `RenderError` (which also covers
/// external-command and network failures specific to its multi-format
/// registry) to the single variant this core's byte→byte contract needs:
/// the renderer either produces output or fails with a message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
    /// Build a `RenderError` from any displayable failure.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A caller-supplied byte→byte transformer (§6.3).
///
/// Total over arbitrary byte input, deterministic, and expected to return
/// errors rather than panic. May return either a borrowed slice of its
/// input or an owned buffer — the `Cow` return type accommodates both,
/// per the ownership note in the design ("the renderer is invoked with a
/// borrowed slice; it may return either a borrowed slice of its input or
/// an owned buffer — both must be handled").
pub trait Render {
    /// Render `input`, returning the rendered bytes or an error.
    fn render<'a>(&self, input: &'a [u8]) -> Result<Cow<'a, [u8]>, RenderError>;
}

/// Blanket impl so a plain closure satisfies [`Render`] directly, matching
/// the spec's description of the renderer as "a fn(bytes) -> bytes | error".
impl<F> Render for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, RenderError>,
{
    fn render<'a>(&self, input: &'a [u8]) -> Result<Cow<'a, [u8]>, RenderError> {
        self(input).map(Cow::Owned)
    }
}

/// Normalize, call, and reconcile one chunk through the caller's renderer.
///
/// `forced_flush` marks that this chunk was emitted by a mid-stream
/// forced flush rather than a natural boundary — only then is the
/// isolated-reference-link reconciliation applied, since it is a
/// documented forced-flush artifact, not a general one.
pub fn render_and_prepare(
    render: &dyn Render,
    chunk: &[u8],
    forced_flush: bool,
) -> Result<Vec<u8>, FlowError> {
    let normalized: Cow<[u8]> = if chunk.ends_with(b"\n") {
        Cow::Borrowed(chunk)
    } else {
        let mut owned = chunk.to_vec();
        owned.push(b'\n');
        Cow::Owned(owned)
    };

    let mut output = render
        .render(&normalized)
        .map_err(|e| FlowError::RenderFailed(e.0))?
        .into_owned();

    if forced_flush && is_isolated_reference_link(&normalized) {
        strip_phantom_blank_suffix(&mut output);
    }

    Ok(output)
}

/// Whether `chunk` consists essentially of a single isolated reference-link
/// definition (`[id]: url`, optionally with a trailing title), give or
/// take the trailing LF normalization added above.
fn is_isolated_reference_link(chunk: &[u8]) -> bool {
    let trimmed = chunk.strip_suffix(b"\n").unwrap_or(chunk);
    if trimmed.is_empty() || trimmed.contains(&b'\n') {
        return false;
    }
    let Some(close) = trimmed.iter().position(|&b| b == b']') else {
        return false;
    };
    if trimmed.first() != Some(&b'[') || close == 0 {
        return false;
    }
    let rest = &trimmed[close + 1..];
    rest.starts_with(b": ") && rest.len() > 2
}

/// Drop one phantom trailing blank line (`"\n\n"` collapsed to `"\n"`)
/// from the renderer's output, per the documented skip-isolated-content
/// reconciliation. A no-op if no such suffix is present.
fn strip_phantom_blank_suffix(output: &mut Vec<u8>) {
    if output.ends_with(b"\n\n") {
        output.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(input: &[u8]) -> Result<Vec<u8>, RenderError> {
        Ok(input.to_vec())
    }

    fn echo_with_phantom_blank(input: &[u8]) -> Result<Vec<u8>, RenderError> {
        let mut out = input.to_vec();
        out.push(b'\n');
        Ok(out)
    }

    fn failing(_input: &[u8]) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::new("boom"))
    }

    #[test]
    fn normalizes_missing_trailing_newline() {
        let out = render_and_prepare(&echo, b"# Hello", false).unwrap();
        assert_eq!(out, b"# Hello\n");
    }

    #[test]
    fn leaves_trailing_newline_alone() {
        let out = render_and_prepare(&echo, b"# Hello\n", false).unwrap();
        assert_eq!(out, b"# Hello\n");
    }

    #[test]
    fn propagates_renderer_errors() {
        let err = render_and_prepare(&failing, b"anything", false).unwrap_err();
        assert!(matches!(err, FlowError::RenderFailed(_)));
    }

    #[test]
    fn strips_phantom_blank_after_isolated_reference_link_on_forced_flush() {
        let out = render_and_prepare(&echo_with_phantom_blank, b"[id]: https://example.com", true)
            .unwrap();
        assert_eq!(out, b"[id]: https://example.com\n");
    }

    #[test]
    fn does_not_strip_phantom_blank_when_not_a_forced_flush() {
        let out = render_and_prepare(&echo_with_phantom_blank, b"[id]: https://example.com", false)
            .unwrap();
        assert_eq!(out, b"[id]: https://example.com\n\n");
    }

    #[test]
    fn does_not_strip_phantom_blank_for_ordinary_content() {
        let out = render_and_prepare(&echo_with_phantom_blank, b"# Heading", true).unwrap();
        assert_eq!(out, b"# Heading\n\n");
    }
}
