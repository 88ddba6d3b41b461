// crates/code_segment/src/tracker.rs

use segment_marker::{MarkerEvent, MarkerKind};

use crate::document::{DocumentContentProvider, DocumentId, SourceLocation};
use crate::error::{ProtocolViolation, Result};
use crate::position::{resolve_position, DocumentPosition};

/// One start/end marker pair.
///
/// The segment is open until its end position is set, and is never changed
/// after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub(crate) document: DocumentId,
    pub(crate) start: DocumentPosition,
    pub(crate) end: Option<DocumentPosition>,
}

impl Segment {
    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn start(&self) -> DocumentPosition {
        self.start
    }

    pub fn end(&self) -> Option<DocumentPosition> {
        self.end
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }
}

/// Accumulates the segments of one scan and enforces strict start/end
/// alternation: at most one segment is open, and it is always the last one.
#[derive(Debug, Clone, Default)]
pub struct SegmentTracker {
    segments: Vec<Segment>,
}

impl SegmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a segment at the line containing `location`.
    ///
    /// Fails without touching the open segment if one is already open.
    pub fn begin_segment<P>(&mut self, provider: &P, location: SourceLocation) -> Result<()>
    where
        P: DocumentContentProvider + ?Sized,
    {
        if let Some(open) = self.open_segment() {
            return Err(ProtocolViolation::StartWhileOpen {
                location,
                open_line: open.start.line,
            }
            .into());
        }

        let index = provider.line_index(location.document)?;
        let start = resolve_position(location, index, MarkerKind::Start)?;
        log::debug!(
            "segment {} opened in {} at line {}",
            self.segments.len(),
            location.document,
            start.line
        );
        self.segments.push(Segment {
            document: location.document,
            start,
            end: None,
        });
        Ok(())
    }

    /// Closes the open segment after the line containing `location`.
    ///
    /// Fails without appending anything if no segment is open, and without
    /// closing the open segment if `location` lies in another document.
    pub fn end_segment<P>(&mut self, provider: &P, location: SourceLocation) -> Result<()>
    where
        P: DocumentContentProvider + ?Sized,
    {
        let seq = self.segments.len();
        let open = match self.segments.last_mut() {
            Some(segment) if !segment.is_closed() => segment,
            _ => return Err(ProtocolViolation::EndWithoutStart { location }.into()),
        };
        if location.document != open.document {
            return Err(ProtocolViolation::CrossDocumentEnd {
                location,
                open_document: open.document,
                open_line: open.start.line,
            }
            .into());
        }

        let index = provider.line_index(open.document)?;
        let end = resolve_position(location, index, MarkerKind::End)?;
        log::debug!(
            "segment {} closed in {} before line {}",
            seq - 1,
            open.document,
            end.line
        );
        open.end = Some(end);
        Ok(())
    }

    /// Dispatches a scanned marker of `document` to `begin_segment` or `end_segment`.
    pub fn handle_marker<P>(
        &mut self,
        provider: &P,
        document: DocumentId,
        event: &MarkerEvent,
    ) -> Result<()>
    where
        P: DocumentContentProvider + ?Sized,
    {
        let location = SourceLocation::new(document, event.offset);
        match event.kind {
            MarkerKind::Start => self.begin_segment(provider, location),
            MarkerKind::End => self.end_segment(provider, location),
        }
    }

    /// All segments in marker order, including a trailing open one.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The currently open segment, if any.
    pub fn open_segment(&self) -> Option<&Segment> {
        self.segments.last().filter(|segment| !segment.is_closed())
    }
}
