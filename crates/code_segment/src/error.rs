// crates/code_segment/src/error.rs

use std::fmt;

use thiserror::Error;

use crate::document::{DocumentId, SourceLocation};

/// A marker event that breaks start/end alternation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// A start marker arrived while the previous segment was still open.
    #[error("start marker while the segment opened at line {open_line} is still open")]
    StartWhileOpen { location: SourceLocation, open_line: usize },

    /// An end marker arrived with no open segment.
    #[error("end marker without a matching start marker")]
    EndWithoutStart { location: SourceLocation },

    /// An end marker arrived in a different document than the open segment.
    #[error("end marker does not belong to the document of the open segment (opened at line {open_line})")]
    CrossDocumentEnd {
        location: SourceLocation,
        open_document: DocumentId,
        open_line: usize,
    },
}

/// The coordinate that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolvable {
    Offset(usize),
    Line(usize),
}

impl fmt::Display for Unresolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolvable::Offset(offset) => write!(f, "byte {}", offset),
            Unresolvable::Line(line) => write!(f, "line {}", line),
        }
    }
}

impl ProtocolViolation {
    /// The location of the marker that caused the violation.
    pub fn location(&self) -> SourceLocation {
        match self {
            ProtocolViolation::StartWhileOpen { location, .. }
            | ProtocolViolation::EndWithoutStart { location }
            | ProtocolViolation::CrossDocumentEnd { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error(transparent)]
    ProtocolViolation(#[from] ProtocolViolation),

    #[error("{target} cannot be resolved to a byte offset in {document} ({len} bytes)")]
    UnresolvableOffset {
        document: DocumentId,
        target: Unresolvable,
        len: usize,
    },

    #[error("segment in {document} ends at byte {end} before it starts at byte {start}")]
    InvertedRange {
        document: DocumentId,
        start: usize,
        end: usize,
    },

    #[error("unknown {0}")]
    UnknownDocument(DocumentId),
}

impl SegmentError {
    /// The marker location the error can be reported against, if any.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            SegmentError::ProtocolViolation(violation) => Some(violation.location()),
            _ => None,
        }
    }

    /// The document the error belongs to.
    pub fn document(&self) -> DocumentId {
        match self {
            SegmentError::ProtocolViolation(violation) => violation.location().document,
            SegmentError::UnresolvableOffset { document, .. }
            | SegmentError::InvertedRange { document, .. }
            | SegmentError::UnknownDocument(document) => *document,
        }
    }
}

pub type Result<T> = std::result::Result<T, SegmentError>;
