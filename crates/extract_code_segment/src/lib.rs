// crates/extract_code_segment/src/lib.rs

use anyhow::{Context, Result};
use std::io::Write;

use code_segment::{
    emit, has_markers, scan_markers, DocumentContentProvider, DocumentSet, MarkerSyntax, SegmentError,
    SegmentTracker,
};

pub mod config;
pub mod inputs;
pub mod output;

use config::{AppConfig, EmitPolicy, OutputFormat};
use inputs::{collect_inputs, load_documents};
use output::write_segment;

/// What one extraction run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Documents scanned.
    pub documents: usize,
    /// Segments written to the sink.
    pub segments: usize,
    /// Segments still open when the scan finished (0 or 1).
    pub unclosed: usize,
}

/// Loads the configured inputs, extracts their segments and writes them to `out`.
pub fn extract_code_segments<W: Write + ?Sized>(
    config: &AppConfig,
    out: &mut W,
) -> Result<ExtractionSummary> {
    let syntax = config.marker_syntax()?;
    let sources = collect_inputs(&config.inputs, &config.extensions)?;
    let documents = load_documents(&sources)?;
    extract_from_documents(&documents, &syntax, config.emit_policy, config.format, out)
}

/// Runs one scan over `documents`.
///
/// The tracker lives for this call only. With `EmitPolicy::PerDocument` the
/// segments closed in a document are written as soon as it has been scanned;
/// those writes stay in place if a later document fails.
pub fn extract_from_documents<W: Write + ?Sized>(
    documents: &DocumentSet,
    syntax: &MarkerSyntax,
    policy: EmitPolicy,
    format: OutputFormat,
    out: &mut W,
) -> Result<ExtractionSummary> {
    let mut tracker = SegmentTracker::new();
    let mut summary = ExtractionSummary::default();

    for id in documents.ids() {
        let name = documents.name_of(id)?;
        let content = documents.content_of(id)?;
        let events = if has_markers(content, syntax) {
            scan_markers(content, syntax)
        } else {
            Vec::new()
        };
        log::info!("Scanning {} ({} marker(s))", name, events.len());

        for event in &events {
            log::debug!("Handling {} ...", syntax.directive(event.kind));
            tracker
                .handle_marker(documents, id, event)
                .map_err(|err| diagnose(documents, err))?;
        }
        summary.documents += 1;

        if policy == EmitPolicy::PerDocument {
            summary.segments += write_pending(&tracker, documents, summary.segments, format, out)?;
            out.flush().context("Failed to flush output")?;
        }
    }

    if policy == EmitPolicy::EndOfScan {
        summary.segments += write_pending(&tracker, documents, 0, format, out)?;
    }
    out.flush().context("Failed to flush output")?;

    if let Some(open) = tracker.open_segment() {
        summary.unclosed = 1;
        log::warn!(
            "{}:{}: segment is never closed; it was not extracted",
            documents.name_of(open.document())?,
            open.start().line
        );
    }
    log::info!(
        "Extracted {} segment(s) from {} document(s)",
        summary.segments,
        summary.documents
    );
    Ok(summary)
}

/// Writes the closed segments of `tracker` past the first `already_written`.
fn write_pending<W: Write + ?Sized>(
    tracker: &SegmentTracker,
    documents: &DocumentSet,
    already_written: usize,
    format: OutputFormat,
    out: &mut W,
) -> Result<usize> {
    let mut written = 0;
    for item in emit(tracker, documents).skip(already_written) {
        let segment = item.map_err(|err| diagnose(documents, err))?;
        write_segment(out, &segment, format)
            .with_context(|| format!("Failed to write segment of {}", segment.document_name))?;
        written += 1;
    }
    Ok(written)
}

/// Attaches the document name (and the marker line, when known) to a core error.
fn diagnose(documents: &DocumentSet, err: SegmentError) -> anyhow::Error {
    let name = match documents.name_of(err.document()) {
        Ok(name) => name.to_string(),
        Err(_) => return anyhow::Error::new(err),
    };
    let prefix = match err.location().and_then(|location| documents.line_of(location)) {
        Some(line) => format!("{}:{}", name, line),
        None => name,
    };
    anyhow::Error::new(err).context(prefix)
}
