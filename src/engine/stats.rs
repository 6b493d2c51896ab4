//! Session summary counters.

use serde::Serialize;

use crate::core::message::{LogicalMessage, Role};
use crate::core::schema::{ContentBlock, RawEvent};
use crate::storage::ReadOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub total_lines: usize,
    pub skipped_lines: usize,
    pub control_records: usize,
    pub participant_records: usize,
    pub assistant_records: usize,
    pub unique_assistant_messages: usize,
    pub reasoning_blocks: usize,
    pub narrative_blocks: usize,
    pub invocations: usize,
    pub results: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
}

impl SessionStats {
    /// Count records from the read pass and tokens from the folded messages.
    ///
    /// Tokens are summed once per logical message (its final usage), so a
    /// reply split over several records is not counted repeatedly.
    pub fn collect(outcome: &ReadOutcome, messages: &[LogicalMessage]) -> Self {
        let mut stats = Self::from_records(outcome);
        stats.add_usage(messages);
        stats
    }

    /// Count lines, records and content blocks from the read pass.
    pub fn from_records(outcome: &ReadOutcome) -> Self {
        let mut stats = SessionStats {
            total_lines: outcome.total_lines,
            skipped_lines: outcome.skipped(),
            control_records: outcome.control_records,
            ..SessionStats::default()
        };

        for event in &outcome.events {
            match event {
                RawEvent::Participant(record) => {
                    stats.participant_records += 1;
                    stats.results += record
                        .blocks()
                        .iter()
                        .filter(|b| matches!(b, ContentBlock::ToolResult { .. }))
                        .count();
                }
                RawEvent::Assistant(record) => {
                    stats.assistant_records += 1;
                    for block in record.blocks() {
                        match block {
                            ContentBlock::Thinking { .. } => stats.reasoning_blocks += 1,
                            ContentBlock::Text { .. } => stats.narrative_blocks += 1,
                            ContentBlock::ToolUse { .. } => stats.invocations += 1,
                            ContentBlock::ToolResult { .. } | ContentBlock::Unsupported => {}
                        }
                    }
                }
                RawEvent::Control(_) | RawEvent::Other => {}
            }
        }

        stats
    }

    /// Add token usage and the unique assistant message count.
    pub fn add_usage(&mut self, messages: &[LogicalMessage]) {
        for message in messages.iter().filter(|m| m.role == Role::Assistant) {
            self.unique_assistant_messages += 1;
            if let Some(usage) = &message.usage {
                self.input_tokens += usage.input_tokens;
                self.output_tokens += usage.output_tokens;
                self.cache_read_tokens += usage.cache_read_input_tokens;
            }
        }
    }

    /// Render a boxed plain-text summary.
    pub fn render_text(&self, source: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("╔{}╗\n", "═".repeat(58)));
        out.push_str(&format!("║{:^58}║\n", "Session Summary"));
        out.push_str(&format!("╚{}╝\n\n", "═".repeat(58)));

        out.push_str(&format!("📄 File: {}\n", source));
        out.push_str(&format!(
            "📊 Lines: {} non-blank ({} skipped)\n\n",
            self.total_lines, self.skipped_lines
        ));

        out.push_str("Records:\n");
        out.push_str(&format!("  • Control records: {}\n", self.control_records));
        out.push_str(&format!("  • User records: {}\n", self.participant_records));
        out.push_str(&format!("  • Assistant records: {}\n", self.assistant_records));
        out.push_str(&format!(
            "  • Unique assistant messages: {}\n\n",
            self.unique_assistant_messages
        ));

        out.push_str("Content:\n");
        out.push_str(&format!("  • 💭 Reasoning blocks: {}\n", self.reasoning_blocks));
        out.push_str(&format!("  • 💬 Text replies: {}\n", self.narrative_blocks));
        out.push_str(&format!("  • 🔧 Tool calls: {}\n", self.invocations));
        out.push_str(&format!("  • 📤 Tool results: {}\n\n", self.results));

        out.push_str("Tokens (final usage per message):\n");
        out.push_str(&format!("  • Input: {}\n", group_thousands(self.input_tokens)));
        out.push_str(&format!("  • Output: {}\n", group_thousands(self.output_tokens)));
        out.push_str(&format!(
            "  • Cache read: {}\n",
            group_thousands(self.cache_read_tokens)
        ));
        out.push_str(&format!(
            "  • Total: {}\n",
            group_thousands(self.input_tokens + self.output_tokens)
        ));
        out
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregate::aggregate;
    use crate::storage::read_events;
    use std::io::Cursor;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_collect_counts_records_and_tokens_once_per_message() {
        let log = concat!(
            r#"{"type":"queue-operation","operation":"enqueue"}"#,
            "\n",
            r#"{"type":"user","timestamp":"1","message":{"content":"go"}}"#,
            "\n",
            r#"{"type":"assistant","timestamp":"2","message":{"id":"m1","content":[{"type":"thinking","thinking":"t"}],"usage":{"input_tokens":10,"output_tokens":2}}}"#,
            "\n",
            r#"{"type":"assistant","timestamp":"3","message":{"id":"m1","content":[{"type":"tool_use","id":"t1","name":"Bash","input":{}}],"usage":{"input_tokens":10,"output_tokens":5,"cache_read_input_tokens":7}}}"#,
            "\n",
            r#"{"type":"user","timestamp":"4","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"ok"}]}}"#,
            "\n",
            "garbage\n",
        );
        let outcome = read_events(Cursor::new(log));
        let messages = aggregate(outcome.events.clone());
        let stats = SessionStats::collect(&outcome, &messages);

        assert_eq!(stats.total_lines, 6);
        assert_eq!(stats.skipped_lines, 1);
        assert_eq!(stats.control_records, 1);
        assert_eq!(stats.participant_records, 2);
        assert_eq!(stats.assistant_records, 2);
        assert_eq!(stats.unique_assistant_messages, 1);
        assert_eq!(stats.reasoning_blocks, 1);
        assert_eq!(stats.invocations, 1);
        assert_eq!(stats.results, 1);
        assert_eq!(stats.input_tokens, 10);
        assert_eq!(stats.output_tokens, 5);
        assert_eq!(stats.cache_read_tokens, 7);

        let text = stats.render_text("case.jsonl");
        assert!(text.contains("Session Summary"));
        assert!(text.contains("📄 File: case.jsonl"));
        assert!(text.contains("Total: 15"));
        assert!(text.contains("📊 Lines: 6 non-blank (1 skipped)"));
        assert!(text.contains("Tokens (final usage per message):\n  • Input: 10\n"));
    }
}
