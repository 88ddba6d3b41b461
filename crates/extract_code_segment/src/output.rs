// crates/extract_code_segment/src/output.rs

use std::io::{self, Write};

use code_segment::ExtractedSegment;

use crate::config::OutputFormat;

/// Writes one extracted segment to the sink.
///
/// In `Text` format the document name goes on its own line, followed by the
/// segment text verbatim. A segment that ends at a buffer without a trailing
/// newline gets one, so the next name starts on a fresh line.
pub fn write_segment<W: Write + ?Sized>(
    out: &mut W,
    segment: &ExtractedSegment<'_>,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{}", segment.document_name)?;
            out.write_all(segment.text.as_bytes())?;
            if !segment.text.is_empty() && !segment.text.ends_with('\n') {
                out.write_all(b"\n")?;
            }
        }
        OutputFormat::Ranges => {
            writeln!(
                out,
                "{}:{}-{}",
                segment.document_name, segment.start_line, segment.end_line
            )?;
        }
    }
    Ok(())
}
