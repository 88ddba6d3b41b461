// crates/code_segment/src/lib.rs

//! Marker tracking and range resolution for `#pragma start_segment` /
//! `#pragma end_segment` pairs.
//!
//! A `SegmentTracker` receives marker locations in document order and turns
//! them into line-aligned segments; `emit` slices the text of every closed
//! segment out of the documents held by a `DocumentContentProvider`.

pub mod document;
pub mod emitter;
pub mod error;
pub mod position;
pub mod tracker;

pub use document::{Document, DocumentContentProvider, DocumentId, DocumentSet, SourceLocation};
pub use emitter::{emit, ExtractedSegment};
pub use error::{ProtocolViolation, Result, SegmentError, Unresolvable};
pub use position::{resolve_position, DocumentPosition, LineIndex};
pub use tracker::{Segment, SegmentTracker};

// Re-exported so callers can drive a tracker without depending on the scanner crate.
pub use segment_marker::{has_markers, scan_markers, MarkerEvent, MarkerKind, MarkerSyntax};

/// Scans every document of `documents` in order and feeds its markers into a
/// fresh tracker.
///
/// Stops at the first protocol violation or unresolvable marker.
pub fn track_documents(documents: &DocumentSet, syntax: &MarkerSyntax) -> Result<SegmentTracker> {
    let mut tracker = SegmentTracker::new();
    for id in documents.ids() {
        let content = documents.content_of(id)?;
        for event in scan_markers(content, syntax) {
            tracker.handle_marker(documents, id, &event)?;
        }
    }
    Ok(tracker)
}
