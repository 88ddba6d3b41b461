// crates/code_segment/src/emitter.rs

use crate::document::DocumentContentProvider;
use crate::error::{Result, SegmentError, Unresolvable};
use crate::position::DocumentPosition;
use crate::tracker::{Segment, SegmentTracker};

/// The verbatim text of one closed segment, borrowed from its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedSegment<'a> {
    pub document_name: &'a str,
    pub text: &'a str,
    /// Line of the start marker.
    pub start_line: usize,
    /// Line of the end marker.
    pub end_line: usize,
}

/// Lazily extracts every closed segment of `tracker`, in marker order.
///
/// A trailing open segment is skipped. The iterator has no memory of earlier
/// calls: emitting twice over an unchanged tracker yields the same items, so a
/// caller that emits more than once per scan skips what it already wrote.
pub fn emit<'a, P>(
    tracker: &'a SegmentTracker,
    provider: &'a P,
) -> impl Iterator<Item = Result<ExtractedSegment<'a>>> + 'a
where
    P: DocumentContentProvider + ?Sized + 'a,
{
    emit_segments(tracker.segments(), provider)
}

fn emit_segments<'a, P>(
    segments: &'a [Segment],
    provider: &'a P,
) -> impl Iterator<Item = Result<ExtractedSegment<'a>>> + 'a
where
    P: DocumentContentProvider + ?Sized + 'a,
{
    segments
        .iter()
        .filter_map(|segment| segment.end().map(|end| (segment, end)))
        .map(move |(segment, end)| extract_segment(segment, end, provider))
}

fn extract_segment<'a, P>(
    segment: &Segment,
    end: DocumentPosition,
    provider: &'a P,
) -> Result<ExtractedSegment<'a>>
where
    P: DocumentContentProvider + ?Sized,
{
    let document = segment.document();
    let start = segment.start();
    if end.byte_offset < start.byte_offset {
        return Err(SegmentError::InvertedRange {
            document,
            start: start.byte_offset,
            end: end.byte_offset,
        });
    }

    let document_name = provider.name_of(document)?;
    let content = provider.content_of(document)?;
    let text = content
        .get(start.byte_offset..end.byte_offset)
        .ok_or(SegmentError::UnresolvableOffset {
            document,
            target: Unresolvable::Offset(end.byte_offset),
            len: content.len(),
        })?;

    Ok(ExtractedSegment {
        document_name,
        text,
        start_line: start.line,
        end_line: end.line - 1,
    })
}
