// crates/code_segment/src/document.rs

use std::fmt;

use crate::error::{Result, SegmentError};
use crate::position::LineIndex;

/// Opaque handle to one document of a `DocumentSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(usize);

impl DocumentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document #{}", self.0)
    }
}

/// A byte location inside one document, already resolved past any macro or
/// inclusion expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub document: DocumentId,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(document: DocumentId, offset: usize) -> Self {
        Self { document, offset }
    }
}

/// Read access to the documents of one scan.
///
/// Buffers must stay unchanged while segments refer to them: segment edges are
/// cached byte offsets.
pub trait DocumentContentProvider {
    /// Display name of the document, typically its path.
    fn name_of(&self, id: DocumentId) -> Result<&str>;

    /// Full buffered content of the document.
    fn content_of(&self, id: DocumentId) -> Result<&str>;

    /// Line start offsets of the document's content.
    fn line_index(&self, id: DocumentId) -> Result<&LineIndex>;
}

#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    content: String,
    line_index: LineIndex,
}

impl Document {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

/// In-memory documents of one scan, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document and indexes its lines.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) -> DocumentId {
        let content = content.into();
        let line_index = LineIndex::new(&content);
        let id = DocumentId(self.documents.len());
        let name = name.into();
        log::debug!("added {} as {} ({} lines)", name, id, line_index.line_count());
        self.documents.push(Document { name, content, line_index });
        id
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        (0..self.documents.len()).map(DocumentId)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Maps a location back to its 1-based line, for diagnostics.
    pub fn line_of(&self, location: SourceLocation) -> Option<usize> {
        self.get(location.document)?.line_index.line_of(location.offset)
    }

    fn document(&self, id: DocumentId) -> Result<&Document> {
        self.get(id).ok_or(SegmentError::UnknownDocument(id))
    }
}

impl DocumentContentProvider for DocumentSet {
    fn name_of(&self, id: DocumentId) -> Result<&str> {
        Ok(&self.document(id)?.name)
    }

    fn content_of(&self, id: DocumentId) -> Result<&str> {
        Ok(&self.document(id)?.content)
    }

    fn line_index(&self, id: DocumentId) -> Result<&LineIndex> {
        Ok(&self.document(id)?.line_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut documents = DocumentSet::new();
        let a = documents.add("a.c", "int a;\n");
        let b = documents.add("b.c", "int b;\n");
        assert_ne!(a, b);
        assert_eq!(documents.ids().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(documents.name_of(b).unwrap(), "b.c");
        assert_eq!(documents.content_of(a).unwrap(), "int a;\n");
        assert_eq!(documents.line_index(a).unwrap().line_count(), 2);
    }

    #[test]
    fn test_unknown_document() {
        let mut other = DocumentSet::new();
        other.add("a.c", "");
        let foreign = other.add("b.c", "");

        let mut documents = DocumentSet::new();
        documents.add("only.c", "");
        assert_eq!(
            documents.name_of(foreign).unwrap_err(),
            SegmentError::UnknownDocument(foreign)
        );
        assert!(documents.line_of(SourceLocation::new(foreign, 0)).is_none());
    }

    #[test]
    fn test_line_of_location() {
        let mut documents = DocumentSet::new();
        let id = documents.add("a.c", "one\ntwo\nthree\n");
        assert_eq!(documents.line_of(SourceLocation::new(id, 5)), Some(2));
        assert_eq!(documents.line_of(SourceLocation::new(id, 100)), None);
    }
}
