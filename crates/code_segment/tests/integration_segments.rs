// crates/code_segment/tests/integration_segments.rs

use code_segment::{
    emit, track_documents, DocumentContentProvider, DocumentSet, MarkerSyntax, ProtocolViolation,
    SegmentError, SegmentTracker, SourceLocation,
};
use rand::Rng;

/// Helper: scans the given documents with the default pragma names.
fn track(documents: &DocumentSet) -> Result<SegmentTracker, SegmentError> {
    track_documents(documents, &MarkerSyntax::default())
}

/// Helper: collects the emitted (name, text) pairs as owned strings.
fn emitted(tracker: &SegmentTracker, documents: &DocumentSet) -> Vec<(String, String)> {
    emit(tracker, documents)
        .map(|item| {
            let segment = item.expect("emission should succeed");
            (segment.document_name.to_string(), segment.text.to_string())
        })
        .collect()
}

#[test]
fn test_adjacent_markers_capture_both_lines() {
    let content = "\
int before;
#pragma start_segment
#pragma end_segment
int after;
";
    let mut documents = DocumentSet::new();
    documents.add("adjacent.c", content);
    let tracker = track(&documents).unwrap();

    assert_eq!(
        emitted(&tracker, &documents),
        vec![(
            "adjacent.c".to_string(),
            "#pragma start_segment\n#pragma end_segment\n".to_string()
        )]
    );
}

#[test]
fn test_directive_lines_are_included() {
    let content = "\
#include <stdio.h>
#pragma start_segment
int add(int a, int b) {
    return a + b;
}
#pragma end_segment
int main(void) { return add(1, 2); }
";
    let mut documents = DocumentSet::new();
    documents.add("add.c", content);
    let tracker = track(&documents).unwrap();

    let out = emitted(&tracker, &documents);
    assert_eq!(out.len(), 1);
    assert_eq!(
        out[0].1,
        "#pragma start_segment\nint add(int a, int b) {\n    return a + b;\n}\n#pragma end_segment\n"
    );
    assert!(!out[0].1.contains("int main"));
}

#[test]
fn test_segments_come_out_in_document_order() {
    let content = "\
#pragma start_segment
first
#pragma end_segment
between
#pragma start_segment
second
#pragma end_segment
";
    let mut documents = DocumentSet::new();
    documents.add("order.c", content);
    let tracker = track(&documents).unwrap();

    let texts: Vec<String> = emitted(&tracker, &documents)
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("first"));
    assert!(texts[1].contains("second"));
    assert!(!texts.iter().any(|text| text.contains("between")));
}

#[test]
fn test_two_documents_are_not_cross_contaminated() {
    let mut documents = DocumentSet::new();
    documents.add("one.c", "1a\n#pragma start_segment\none\n#pragma end_segment\n1b\n");
    documents.add("two.c", "#pragma start_segment\ntwo\n#pragma end_segment\n2b\n");
    let tracker = track(&documents).unwrap();

    assert_eq!(
        emitted(&tracker, &documents),
        vec![
            (
                "one.c".to_string(),
                "#pragma start_segment\none\n#pragma end_segment\n".to_string()
            ),
            (
                "two.c".to_string(),
                "#pragma start_segment\ntwo\n#pragma end_segment\n".to_string()
            ),
        ]
    );
}

#[test]
fn test_emit_twice_is_identical() {
    let mut documents = DocumentSet::new();
    documents.add("twice.c", "#pragma start_segment\nx\n#pragma end_segment\n");
    let tracker = track(&documents).unwrap();
    assert_eq!(emitted(&tracker, &documents), emitted(&tracker, &documents));
}

#[test]
fn test_double_start_in_document_is_a_protocol_violation() {
    let content = "#pragma start_segment\na\n#pragma start_segment\nb\n#pragma end_segment\n";
    let mut documents = DocumentSet::new();
    let id = documents.add("double.c", content);

    let err = track(&documents).unwrap_err();
    match err {
        SegmentError::ProtocolViolation(ProtocolViolation::StartWhileOpen { location, open_line }) => {
            assert_eq!(location.document, id);
            assert_eq!(documents.line_of(location), Some(3));
            assert_eq!(open_line, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_stray_end_is_a_protocol_violation() {
    let mut documents = DocumentSet::new();
    documents.add("stray.c", "int a;\n#pragma end_segment\n");
    let err = track(&documents).unwrap_err();
    assert!(matches!(
        err,
        SegmentError::ProtocolViolation(ProtocolViolation::EndWithoutStart { .. })
    ));
    assert!(err.to_string().contains("without a matching start"));
}

#[test]
fn test_segment_left_open_across_documents_is_rejected() {
    let mut documents = DocumentSet::new();
    documents.add("opens.c", "#pragma start_segment\nint a;\n");
    documents.add("closes.c", "int b;\n#pragma end_segment\n");

    let err = track(&documents).unwrap_err();
    assert!(matches!(
        err,
        SegmentError::ProtocolViolation(ProtocolViolation::CrossDocumentEnd { .. })
    ));
}

#[test]
fn test_unclosed_trailing_segment_is_not_emitted() {
    let mut documents = DocumentSet::new();
    documents.add(
        "open.c",
        "#pragma start_segment\ndone\n#pragma end_segment\n#pragma start_segment\nunfinished\n",
    );
    let tracker = track(&documents).unwrap();
    assert!(tracker.open_segment().is_some());

    let out = emitted(&tracker, &documents);
    assert_eq!(out.len(), 1);
    assert!(out[0].1.contains("done"));
}

#[test]
fn test_end_marker_on_last_line_without_newline() {
    let content = "x\n#pragma start_segment\ny\n#pragma end_segment";
    let mut documents = DocumentSet::new();
    documents.add("eof.c", content);
    let tracker = track(&documents).unwrap();
    assert_eq!(
        emitted(&tracker, &documents)[0].1,
        "#pragma start_segment\ny\n#pragma end_segment"
    );
}

#[test]
fn test_tracker_driven_by_hand_matches_line_slice() {
    let mut documents = DocumentSet::new();
    let id = documents.add("letters.txt", "A\nB\nC\nD\n");
    let mut tracker = SegmentTracker::new();
    // Start marker on line 2, end marker on line 3.
    tracker.begin_segment(&documents, SourceLocation::new(id, 2)).unwrap();
    tracker.end_segment(&documents, SourceLocation::new(id, 4)).unwrap();

    assert_eq!(
        emitted(&tracker, &documents),
        vec![("letters.txt".to_string(), "B\nC\n".to_string())]
    );
    assert_eq!(documents.name_of(id).unwrap(), "letters.txt");
}

#[test]
fn test_random_well_formed_documents() {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let pairs = rng.gen_range(0..6);
        let mut content = String::new();
        let mut expected = Vec::new();
        for pair in 0..pairs {
            for filler in 0..rng.gen_range(0..3) {
                content.push_str(&format!("outside {pair} {filler}\n"));
            }
            let mut body = String::from("#pragma start_segment\n");
            for line in 0..rng.gen_range(0..4) {
                body.push_str(&format!("inside {pair} {line}\n"));
            }
            body.push_str("#pragma end_segment\n");
            content.push_str(&body);
            expected.push(body);
        }
        content.push_str("trailer\n");

        let mut documents = DocumentSet::new();
        documents.add("random.c", content);
        let tracker = track(&documents).unwrap();
        let texts: Vec<String> = emitted(&tracker, &documents)
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        assert_eq!(texts, expected);
    }
}
