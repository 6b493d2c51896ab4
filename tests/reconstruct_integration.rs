//! End-to-end reconstruction tests: log text in, rendered documents out.

use std::io::Cursor;

use session_restore::core::{Role, Segment};
use session_restore::report::{OutputFormat, render};
use session_restore::{Reconstruction, reconstruct, reconstruct_file};

fn from_lines(lines: &[&str]) -> Reconstruction {
    reconstruct(Cursor::new(lines.join("\n")))
}

#[test]
fn test_single_assistant_message() {
    let rec = from_lines(&[
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:00Z","message":{"id":"m1","content":[{"type":"text","text":"hello"}]}}"#,
    ]);
    assert_eq!(rec.messages.len(), 1);
    assert_eq!(rec.messages[0].role, Role::Assistant);

    let out = render(&rec, OutputFormat::Text);
    assert_eq!(out.matches("🤖 Assistant").count(), 1);
    assert!(out.contains("\nhello\n"));
    assert!(!out.contains("Result"));
}

#[test]
fn test_split_message_with_correlated_result() {
    let rec = from_lines(&[
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:00Z","message":{"id":"m1","content":[{"type":"thinking","thinking":"let me look"}]}}"#,
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:01Z","message":{"id":"m1","content":[{"type":"text","text":"Reading."},{"type":"tool_use","id":"t1","name":"Read","input":{"file_path":"a.rs"}}]}}"#,
        r#"{"type":"user","timestamp":"2025-01-01T10:00:02Z","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"done"}]}}"#,
    ]);

    assert_eq!(rec.messages.len(), 1);
    let parts = &rec.messages[0].parts;
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], Segment::Reasoning(t) if t == "let me look"));
    assert!(matches!(&parts[1], Segment::Narrative(t) if t == "Reading."));
    assert!(matches!(&parts[2], Segment::Invocation(i) if i.id == "t1"));

    let html = render(&rec, OutputFormat::Html);
    let start = html
        .find("<div class=\"tool-result\" data-tool-id=\"t1\">")
        .expect("result block for t1");
    let block = &html[start..];
    let end = block.find("</pre>").expect("result body");
    assert!(block[..end].contains("done"));
}

#[test]
fn test_markdown_character_threshold_path() {
    let body = format!("{}\\nb\\nc\\nd\\ne", "a".repeat(993));
    let rec = from_lines(&[
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:00Z","message":{"id":"m1","content":[{"type":"tool_use","id":"t1","name":"Bash","input":{"command":"cat"}}]}}"#,
        &format!(
            r#"{{"type":"user","timestamp":"2025-01-01T10:00:01Z","message":{{"content":[{{"type":"tool_result","tool_use_id":"t1","content":"{body}"}}]}}}}"#
        ),
    ]);
    let stored = &rec.correlation.lookup("t1").unwrap().body;
    assert_eq!(stored.chars().count(), 1001);
    assert_eq!(stored.lines().count(), 5);

    let md = render(&rec, OutputFormat::Markdown);
    let shown: String = stored.chars().take(1000).collect();
    assert!(md.contains(&format!("{shown}...")));
    assert!(!md.contains("more lines"));
}

#[test]
fn test_segments_keep_read_order_despite_timestamps() {
    let rec = from_lines(&[
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:05Z","message":{"id":"m1","content":[{"type":"text","text":"first"}]}}"#,
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:01Z","message":{"id":"m1","content":[{"type":"text","text":"second"}]}}"#,
    ]);
    assert_eq!(rec.messages.len(), 1);
    assert_eq!(rec.messages[0].timestamp, "2025-01-01T10:00:05Z");

    let out = render(&rec, OutputFormat::Text);
    let first = out.find("first").unwrap();
    let second = out.find("second").unwrap();
    assert!(first < second);
}

#[test]
fn test_duplicate_result_first_wins_in_every_format() {
    let rec = from_lines(&[
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:00Z","message":{"id":"m1","content":[{"type":"tool_use","id":"t1","name":"Bash","input":{}}]}}"#,
        r#"{"type":"user","timestamp":"2025-01-01T10:00:01Z","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"original-body"}]}}"#,
        r#"{"type":"user","timestamp":"2025-01-01T10:00:02Z","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"replacement-body"}]}}"#,
    ]);

    for format in [OutputFormat::Text, OutputFormat::Markdown, OutputFormat::Html] {
        let out = render(&rec, format);
        assert!(out.contains("original-body"), "{format:?}");
        assert!(!out.contains("replacement-body"), "{format:?}");
    }
}

#[test]
fn test_messages_sorted_and_malformed_lines_skipped() {
    let rec = from_lines(&[
        r#"{"type":"user","timestamp":"2025-01-01T10:00:02Z","message":{"content":"later question"}}"#,
        "{broken",
        r#"{"type":"queue-operation","operation":"enqueue","timestamp":"2025-01-01T09:00:00Z"}"#,
        r#"{"type":"user","timestamp":"2025-01-01T10:00:00Z","message":{"content":"first question"}}"#,
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:01Z","message":{"id":"m1","content":[{"type":"text","text":"answer"}]}}"#,
    ]);

    assert_eq!(rec.skipped(), 1);
    assert_eq!(rec.diagnostics[0].line, 2);
    let roles: Vec<Role> = rec.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::Participant, Role::Assistant, Role::Participant]);
    assert_eq!(rec.stats.control_records, 1);
}

#[test]
fn test_render_is_deterministic() {
    let lines = [
        r#"{"type":"user","timestamp":"2025-01-01T10:00:00Z","message":{"content":"**hi** `x`"}}"#,
        r#"{"type":"assistant","timestamp":"2025-01-01T10:00:01Z","message":{"id":"m1","content":[{"type":"thinking","thinking":"hmm"},{"type":"tool_use","id":"t1","name":"Grep","input":{"pattern":"a","path":"."}}],"usage":{"input_tokens":10,"output_tokens":3}}}"#,
        r#"{"type":"user","timestamp":"2025-01-01T10:00:02Z","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":[{"type":"text","text":"one"},{"type":"text","text":"two"}]}]}}"#,
    ];
    for format in [OutputFormat::Text, OutputFormat::Markdown, OutputFormat::Html] {
        assert_eq!(
            render(&from_lines(&lines), format),
            render(&from_lines(&lines), format)
        );
    }
}

#[test]
fn test_reconstruct_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("case.jsonl");
    std::fs::write(
        &path,
        r#"{"type":"user","timestamp":"2025-01-01T10:00:00Z","message":{"content":"from disk"}}"#,
    )
    .unwrap();

    let rec = reconstruct_file(&path).unwrap();
    assert_eq!(rec.messages.len(), 1);
    assert!(render(&rec, OutputFormat::Markdown).contains("from disk"));
}
