//! Line-oriented text merges.
//!
//! Language files, plain text and scripts merge by set union of their lines
//! in first-seen order. Anything else textual is concatenated.

use std::collections::HashSet;

/// How lines are normalized before the union.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineMode {
    /// Trim surrounding whitespace and drop empty lines (`.lang`, `.txt`).
    Trimmed,
    /// Keep lines byte for byte; blank lines take part in the union like any
    /// other line (`.js`).
    Verbatim,
}

/// Union the lines of every input, first-seen order, joined with `\n`.
///
/// A trailing newline terminates the last line of an input rather than
/// adding an empty line.
#[must_use]
pub fn line_union<'a>(contents: impl IntoIterator<Item = &'a str>, mode: LineMode) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut lines: Vec<&str> = Vec::new();

    for content in contents {
        for raw in content.split_terminator('\n') {
            let line = match mode {
                LineMode::Trimmed => raw.trim(),
                LineMode::Verbatim => raw,
            };
            if mode == LineMode::Trimmed && line.is_empty() {
                continue;
            }
            if seen.insert(line) {
                lines.push(line);
            }
        }
    }

    lines.join("\n")
}

/// Join every input with a single `\n`, in order.
#[must_use]
pub fn concatenate<'a>(contents: impl IntoIterator<Item = &'a str>) -> String {
    contents.into_iter().collect::<Vec<_>>().join("\n")
}
