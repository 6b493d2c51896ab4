//! Markdown transcript renderer.
//!
//! Narrative and reasoning text is assumed to already be markdown and is
//! passed through untouched.

use crate::core::message::{Invocation, LogicalMessage, Segment};
use crate::engine::CorrelationIndex;

use super::{ResultPreview, TruncationPolicy, format_timestamp, usage_line};

const FENCE: &str = "```";

/// Render messages as a markdown document.
pub fn render_markdown(messages: &[LogicalMessage], correlation: &CorrelationIndex) -> String {
    let mut out = String::new();
    out.push_str("# Session Transcript\n\n");

    for message in messages {
        out.push_str("---\n\n");
        render_message(&mut out, message, correlation);
    }

    out.push_str("---\n\n*End of session*\n");
    out
}

fn render_message(out: &mut String, message: &LogicalMessage, correlation: &CorrelationIndex) {
    out.push_str(&format!(
        "## {} {} · {}\n\n",
        message.role.icon(),
        message.role.label(),
        format_timestamp(&message.timestamp)
    ));
    if let Some(usage) = &message.usage {
        out.push_str(&format!("> 📊 {}\n\n", usage_line(usage)));
    }

    for part in &message.parts {
        match part {
            Segment::Reasoning(text) => {
                out.push_str("<details>\n<summary>💭 Reasoning</summary>\n\n");
                out.push_str(text.trim_end());
                out.push_str("\n\n</details>\n\n");
            }
            Segment::Narrative(text) => {
                out.push_str(text.trim_end());
                out.push_str("\n\n");
            }
            Segment::Invocation(invocation) => render_invocation(out, invocation, correlation),
        }
    }
}

fn render_invocation(out: &mut String, invocation: &Invocation, correlation: &CorrelationIndex) {
    out.push_str(&format!("### 🔧 Tool call: `{}`\n\n", invocation.name));
    out.push_str(&format!("ID: `{}`\n\n", invocation.id));

    if !invocation.arguments.is_empty() {
        let args = serde_json::to_string_pretty(&invocation.arguments)
            .unwrap_or_else(|_| "{}".to_string());
        let fence = fence_for(&args);
        out.push_str(&format!("{fence}json\n{args}\n{fence}\n\n"));
    }

    let Some(result) = correlation.lookup(&invocation.id) else {
        return;
    };

    out.push_str("**📤 Result**\n\n");
    let (shown, notice, complete) = match TruncationPolicy::MARKUP.apply(&result.body) {
        ResultPreview::Full(body) => (body, None, true),
        ResultPreview::Lines { shown, remaining } => {
            (shown, Some(format!("*... ({remaining} more lines)*")), false)
        }
        ResultPreview::Chars { shown } => (format!("{shown}..."), None, false),
    };

    // A cut pre-fenced body has lost its closing fence, so it gets wrapped too.
    if complete && result.body.starts_with(FENCE) {
        out.push_str(shown.trim_end());
        out.push('\n');
    } else {
        let fence = fence_for(&shown);
        out.push_str(&format!("{fence}\n{}\n{fence}\n", shown.trim_end_matches('\n')));
    }
    out.push('\n');

    if let Some(notice) = notice {
        out.push_str(&notice);
        out.push_str("\n\n");
    }
}

/// A backtick fence longer than any backtick run inside `body`.
fn fence_for(body: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in body.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn message_with_call(id: &str) -> LogicalMessage {
        let mut arguments = Map::new();
        arguments.insert("command".to_string(), json!("ls -la"));
        arguments.insert("timeout".to_string(), json!(30));
        let mut message = LogicalMessage::assistant(
            "m1".to_string(),
            "2025-01-01T10:00:00Z".to_string(),
            None,
        );
        message.parts = vec![
            Segment::Reasoning("thinking **hard**".to_string()),
            Segment::Narrative("Running it.".to_string()),
            Segment::Invocation(Invocation {
                id: id.to_string(),
                name: "Bash".to_string(),
                arguments,
            }),
        ];
        message
    }

    #[test]
    fn test_structure() {
        let mut index = CorrelationIndex::new();
        index.register("t1", "total 0".to_string(), None);
        let out = render_markdown(&[message_with_call("t1")], &index);

        assert!(out.starts_with("# Session Transcript\n\n"));
        assert!(out.contains("## 🤖 Assistant · 2025-01-01 10:00:00"));
        assert!(out.contains("<details>\n<summary>💭 Reasoning</summary>\n\nthinking **hard**\n\n</details>"));
        assert!(out.contains("Running it.\n\n"));
        assert!(out.contains("### 🔧 Tool call: `Bash`"));
        assert!(out.contains("```json\n{\n  \"command\": \"ls -la\",\n  \"timeout\": 30\n}\n```"));
        assert!(out.contains("**📤 Result**\n\n```\ntotal 0\n```\n"));
    }

    #[test]
    fn test_prefenced_result_emitted_unchanged() {
        let mut index = CorrelationIndex::new();
        index.register("t1", "```rust\nfn main() {}\n```".to_string(), None);
        let out = render_markdown(&[message_with_call("t1")], &index);
        assert!(out.contains("**📤 Result**\n\n```rust\nfn main() {}\n```\n"));
        assert!(!out.contains("```\n```rust"));
    }

    #[test]
    fn test_truncated_prefenced_result_stays_closed() {
        let mut index = CorrelationIndex::new();
        let body = format!("```\n{}\n```", vec!["y".repeat(40); 40].join("\n"));
        index.register("t1", body, None);

        let mut call = message_with_call("t1");
        call.parts.retain(|p| matches!(p, Segment::Invocation(_)));
        let mut after = LogicalMessage::assistant(
            "m2".to_string(),
            "2025-01-01T10:00:05Z".to_string(),
            None,
        );
        after.parts = vec![Segment::Narrative("after".to_string())];
        let out = render_markdown(&[call, after], &index);

        let opening = "**📤 Result**\n\n````\n```\n";
        let open = out.find(opening).expect("wrapped result");
        let body_start = open + opening.len();
        let close = out[body_start..]
            .find("\n````\n")
            .map(|i| i + body_start)
            .expect("closing fence");
        let notice = out.find("*... (12 more lines)*").unwrap();
        let heading = out.find("## 🤖 Assistant · 2025-01-01 10:00:05").unwrap();
        assert!(close < notice);
        assert!(notice < heading);
        assert!(heading < out.find("\nafter\n").unwrap());

        // Outside the result, fence lines pair up.
        let fences = out[..open]
            .lines()
            .chain(out[close + "\n````\n".len()..].lines())
            .filter(|l| l.starts_with("```"))
            .count();
        assert_eq!(fences % 2, 0);
    }

    #[test]
    fn test_char_threshold_path() {
        let mut index = CorrelationIndex::new();
        let body = format!("{}\nb\nc\nd\ne", "a".repeat(993));
        assert_eq!(body.chars().count(), 1001);
        index.register("t1", body.clone(), None);
        let out = render_markdown(&[message_with_call("t1")], &index);

        let expected: String = body.chars().take(1000).collect();
        assert!(out.contains(&format!("{expected}...")));
        assert!(!out.contains("more lines"));
    }

    #[test]
    fn test_line_threshold_path() {
        let mut index = CorrelationIndex::new();
        index.register("t1", vec!["x".repeat(40); 40].join("\n"), None);
        let out = render_markdown(&[message_with_call("t1")], &index);
        assert!(out.contains("*... (10 more lines)*"));
    }

    #[test]
    fn test_fence_grows_past_inner_backticks() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("has ``` inside"), "````");
    }

    #[test]
    fn test_deterministic() {
        let messages = [message_with_call("t1")];
        let index = CorrelationIndex::new();
        assert_eq!(
            render_markdown(&messages, &index),
            render_markdown(&messages, &index)
        );
    }
}
