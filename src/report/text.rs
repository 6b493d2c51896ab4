//! Plain-text transcript renderer.

use serde_json::Value;

use crate::core::message::{Invocation, LogicalMessage, Role, Segment};
use crate::engine::CorrelationIndex;

use super::{ResultPreview, TruncationPolicy, format_timestamp, truncate_chars, usage_line};

const RULE_WIDTH: usize = 80;
const BANNER_WIDTH: usize = 78;
const MAX_ARGUMENT_CHARS: usize = 100;

const OPENED_FILE_START: &str = "<ide_opened_file>";
const OPENED_FILE_END: &str = "</ide_opened_file>";

/// Render messages as a boxed plain-text transcript.
pub fn render_text(messages: &[LogicalMessage], correlation: &CorrelationIndex) -> String {
    let mut output: Vec<String> = Vec::new();
    output.push(banner("Session Transcript"));
    output.push(String::new());

    for message in messages {
        output.push(render_message(message, correlation));
        output.push(String::new());
    }

    output.push("\n".to_string());
    output.push(banner("End of Session"));
    output.join("\n")
}

fn banner(title: &str) -> String {
    let edge = "═".repeat(BANNER_WIDTH);
    format!(
        "╔{edge}╗\n║{title:^width$}║\n╚{edge}╝",
        width = BANNER_WIDTH
    )
}

fn render_message(message: &LogicalMessage, correlation: &CorrelationIndex) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(heavy.clone());
    lines.push(format!(
        "{} {} [{}]",
        message.role.icon(),
        message.role.label(),
        format_timestamp(&message.timestamp)
    ));
    if let Some(usage) = &message.usage {
        lines.push(format!("📊 {}", usage_line(usage)));
    }
    lines.push(heavy);

    for part in &message.parts {
        match part {
            Segment::Reasoning(text) => {
                lines.push("\n💭 Reasoning:".to_string());
                lines.push(light.clone());
                lines.push(indent_reasoning(text));
                lines.push(light.clone());
            }
            Segment::Narrative(text) => match message.role {
                Role::Participant => lines.push(narrative_text(text)),
                Role::Assistant => {
                    lines.push("\n💬 Reply:".to_string());
                    lines.push(light.clone());
                    lines.push(narrative_text(text));
                    lines.push(light.clone());
                }
            },
            Segment::Invocation(invocation) => {
                lines.push(format!("\n{}", render_invocation(invocation, correlation)));
            }
        }
    }

    lines.join("\n")
}

/// Indent non-blank reasoning lines by two spaces; blank lines are dropped.
fn indent_reasoning(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Narrative text as written, except opened-file annotations get a folder prefix.
fn narrative_text(text: &str) -> String {
    if text.contains(OPENED_FILE_START) {
        let stripped = text
            .replace(OPENED_FILE_START, "")
            .replace(OPENED_FILE_END, "");
        format!("📂 {}", stripped.trim())
    } else {
        text.to_string()
    }
}

fn argument_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_ARGUMENT_CHARS => {
            format!("{}...", truncate_chars(s, MAX_ARGUMENT_CHARS))
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_invocation(invocation: &Invocation, correlation: &CorrelationIndex) -> String {
    let mut lines = vec![
        format!("  🔧 Tool call: {}", invocation.name),
        format!("  ID: {}", invocation.id),
    ];

    if !invocation.arguments.is_empty() {
        lines.push("  Arguments:".to_string());
        for (name, value) in &invocation.arguments {
            lines.push(format!("    {}: {}", name, argument_value(value)));
        }
    }

    if let Some(result) = correlation.lookup(&invocation.id) {
        lines.push("\n  📤 Result:".to_string());
        match TruncationPolicy::PLAIN_TEXT.apply(&result.body) {
            ResultPreview::Full(body) => lines.push(indent_block(&body)),
            ResultPreview::Lines { shown, remaining } => {
                lines.push(indent_block(&shown));
                lines.push(format!("    ... ({remaining} more lines)"));
            }
            ResultPreview::Chars { shown } => lines.push(format!("{}...", indent_block(&shown))),
        }
    }

    lines.join("\n")
}

fn indent_block(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
