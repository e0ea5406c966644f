//! Fence/structure tracker.
//!
//! [`FenceState`] is a line-by-line classifier that tracks open code-fence
//! levels, YAML frontmatter, and table rows, and answers "is position P
//! inside protected content?". Classification is total, left-to-right,
//! single-pass, and incremental: classifying line *k* depends only on the
//! state after line *k-1* plus the bytes of line *k*.
//!
//! Byte-oriented throughout — no UTF-8 assumption, no character-class
//! machinery. The bytes this module cares about are LF (`0x0A`), backtick
//! (`0x60`), tilde (`0x7E`), hyphen (`0x2D`), and pipe (`0x7C`).

/// Process-local fence/frontmatter/table tracker.
///
/// One instance lives per [`crate::flow::flow`] call; it is mutated one
/// line at a time by [`FenceState::classify_line`].
#[derive(Debug, Clone, Default)]
pub struct FenceState {
    /// Open fence levels, LIFO. A closing line of N backticks/tildes
    /// closes the topmost entry whose level equals N.
    stack: Vec<usize>,
    /// True between the opening `---` on line 1 and its matching closer.
    in_frontmatter: bool,
    /// True from a table header row until a blank line ends the table.
    in_table: bool,
    /// Set after a line that looks like a table header row; consumed by
    /// the following line, which confirms or rejects the table.
    pending_table_header: bool,
    /// Number of lines classified so far (used to detect "document start").
    lines_classified: u64,
}

impl FenceState {
    /// Create a fresh tracker, as at the start of a document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a position just after the most recently classified line is
    /// protected: inside an open fence, open frontmatter, or an open table.
    pub fn is_protected(&self) -> bool {
        !self.stack.is_empty() || self.in_frontmatter || self.in_table
    }

    /// Whether the tracker is in a *clean* state: no open fence, no open
    /// frontmatter, no open table. A safe cut may only land here.
    pub fn is_clean(&self) -> bool {
        !self.is_protected()
    }

    /// Depth of the fence stack (for the fence-depth-correctness property:
    /// well-formed input leaves this at 0 at EOF).
    pub fn fence_depth(&self) -> usize {
        self.stack.len()
    }

    /// Classify one line (without its terminating LF). Total: never fails.
    pub fn classify_line(&mut self, line: &[u8]) {
        self.lines_classified += 1;
        let trimmed = trim_ascii_whitespace(line);

        if self.in_frontmatter {
            if trimmed == b"---" {
                self.in_frontmatter = false;
            }
            return;
        }

        if self.lines_classified == 1 && trimmed == b"---" {
            self.in_frontmatter = true;
            return;
        }

        if let Some(&level) = self.stack.last() {
            if fence_close_match(trimmed, level) {
                self.stack.pop();
            }
            // Everything else inside a fence is verbatim: no table tracking.
            return;
        }

        if let Some(n) = fence_open_run(trimmed) {
            self.stack.push(n);
            self.in_table = false;
            self.pending_table_header = false;
            return;
        }

        if trimmed.is_empty() {
            self.in_table = false;
            self.pending_table_header = false;
            return;
        }

        if self.in_table {
            return;
        }

        if self.pending_table_header {
            self.pending_table_header = false;
            if is_alignment_row(trimmed) {
                self.in_table = true;
            }
            return;
        }

        if is_pipe_row(trimmed) {
            self.pending_table_header = true;
        }
    }
}

/// Trim ASCII whitespace (space, tab, CR) from both ends. Byte-oriented;
/// does not assume UTF-8.
fn trim_ascii_whitespace(mut s: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = s {
        if first.is_ascii_whitespace() {
            s = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = s {
        if last.is_ascii_whitespace() {
            s = rest;
        } else {
            break;
        }
    }
    s
}

/// Count of a leading run of backticks or tildes, if any, with no
/// requirement on what follows (permits an info string). Returns `None`
/// if the run is shorter than 3 or the line doesn't start with a fence
/// character.
fn fence_open_run(trimmed: &[u8]) -> Option<usize> {
    let fence_char = *trimmed.first()?;
    if fence_char != b'`' && fence_char != b'~' {
        return None;
    }
    let n = trimmed.iter().take_while(|&&b| b == fence_char).count();
    if n >= 3 { Some(n) } else { None }
}

/// Whether `trimmed` is a pure closing fence line of exactly `level`
/// backticks/tildes — nothing but whitespace may follow the run. Closing
/// lines, unlike openers, do not carry an info string.
fn fence_close_match(trimmed: &[u8], level: usize) -> bool {
    let Some(fence_char) = trimmed.first().copied() else {
        return false;
    };
    if fence_char != b'`' && fence_char != b'~' {
        return false;
    }
    let n = trimmed.iter().take_while(|&&b| b == fence_char).count();
    if n != level {
        return false;
    }
    trim_ascii_whitespace(&trimmed[n..]).is_empty()
}

/// A lenient "looks like a table row" check: contains at least one pipe
/// outside of being entirely whitespace. Deliberately permissive — per
/// the design's documented ambiguity, over-detecting a table row only
/// affects *where* a safe boundary is found, never output correctness.
fn is_pipe_row(trimmed: &[u8]) -> bool {
    trimmed.contains(&b'|')
}

/// Whether `trimmed` is a table alignment row: made up only of `-`, `|`,
/// `:`, and whitespace, with at least one hyphen.
fn is_alignment_row(trimmed: &[u8]) -> bool {
    let mut saw_hyphen = false;
    for &b in trimmed {
        match b {
            b'-' => saw_hyphen = true,
            b'|' | b':' | b' ' | b'\t' => {}
            _ => return false,
        }
    }
    saw_hyphen
}
