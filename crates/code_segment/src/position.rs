// crates/code_segment/src/position.rs

use segment_marker::MarkerKind;

use crate::document::SourceLocation;
use crate::error::{Result, SegmentError, Unresolvable};

/// The byte offset of column 1 of a line within a document buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPosition {
    /// 1-based line number.
    pub line: usize,
    pub byte_offset: usize,
}

/// Start offsets of every line of one buffer, computed once per document.
///
/// A buffer ending in `\n` has a final empty line starting at the buffer length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(content.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { line_starts, len: content.len() }
    }

    /// Number of lines, counting the empty line after a trailing newline.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length in bytes of the indexed buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the 1-based line containing `offset`, or `None` past the end of the buffer.
    pub fn line_of(&self, offset: usize) -> Option<usize> {
        if offset > self.len {
            return None;
        }
        Some(self.line_starts.partition_point(|&start| start <= offset))
    }

    /// Returns the byte offset of column 1 of the 1-based `line`.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx))
            .copied()
    }
}

/// Resolves a marker location to the line boundary used as a segment edge.
///
/// A start marker resolves to the beginning of its own line. An end marker
/// resolves to the beginning of the following line, so the end directive's
/// line is part of the segment. When the end marker sits on the last line of a
/// buffer without a trailing newline, the position clamps to the buffer end.
pub fn resolve_position(
    location: SourceLocation,
    index: &LineIndex,
    kind: MarkerKind,
) -> Result<DocumentPosition> {
    let unresolvable = |target| SegmentError::UnresolvableOffset {
        document: location.document,
        target,
        len: index.len(),
    };

    let marker_line = index
        .line_of(location.offset)
        .ok_or_else(|| unresolvable(Unresolvable::Offset(location.offset)))?;
    let line = match kind {
        MarkerKind::Start => marker_line,
        MarkerKind::End => marker_line + 1,
    };

    let byte_offset = match index.line_start(line) {
        Some(offset) => offset,
        None if kind == MarkerKind::End && line == index.line_count() + 1 => index.len(),
        None => return Err(unresolvable(Unresolvable::Line(line))),
    };

    Ok(DocumentPosition { line, byte_offset })
}
