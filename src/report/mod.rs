//! Rendering module for reconstructed sessions.
//!
//! This module provides:
//! - Plain-text transcripts (`text`)
//! - Markdown transcripts (`markdown`)
//! - Standalone HTML transcripts with embedded CSS and JS (`html`)
//! - The markdown-subset to HTML converter used by the HTML renderer (`inline`)
//!
//! Every renderer is a pure function of a `Reconstruction`: same input, same bytes.

pub mod html;
pub mod inline;
pub mod markdown;
pub mod text;

use clap::ValueEnum;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::core::message::Usage;
use crate::engine::Reconstruction;

// Re-export key functions
pub use html::{html_escape, render_html};
pub use inline::markdown_to_html;
pub use markdown::render_markdown;
pub use text::render_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Boxed plain-text transcript
    #[value(alias = "txt", alias = "plain")]
    Text,
    /// Markdown transcript
    #[value(alias = "md")]
    Markdown,
    /// Standalone HTML page
    #[value(alias = "htm")]
    Html,
}

impl OutputFormat {
    /// Suffix appended to the input's base name for the output file.
    pub fn suffix(&self) -> &'static str {
        match self {
            OutputFormat::Text => "_restored.txt",
            OutputFormat::Markdown => "_restored.md",
            OutputFormat::Html => "_restored.html",
        }
    }
}

/// Render a reconstruction in the chosen format.
pub fn render(reconstruction: &Reconstruction, format: OutputFormat) -> String {
    let messages = &reconstruction.messages;
    let correlation = &reconstruction.correlation;
    match format {
        OutputFormat::Text => render_text(messages, correlation),
        OutputFormat::Markdown => render_markdown(messages, correlation),
        OutputFormat::Html => render_html(messages, correlation),
    }
}

/// Size limits applied to capability result bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    pub max_chars: usize,
    pub max_lines: usize,
}

impl TruncationPolicy {
    pub const PLAIN_TEXT: TruncationPolicy = TruncationPolicy {
        max_chars: 500,
        max_lines: 20,
    };
    pub const MARKUP: TruncationPolicy = TruncationPolicy {
        max_chars: 1000,
        max_lines: 30,
    };

    /// Decide how much of a result body to show.
    ///
    /// Bodies within `max_chars` are shown whole. Longer bodies with more
    /// than `max_lines` lines are cut by lines, otherwise by characters.
    pub fn apply(&self, body: &str) -> ResultPreview {
        if body.chars().count() <= self.max_chars {
            return ResultPreview::Full(body.to_string());
        }

        let lines: Vec<&str> = body.split('\n').collect();
        if lines.len() > self.max_lines {
            ResultPreview::Lines {
                shown: lines[..self.max_lines].join("\n"),
                remaining: lines.len() - self.max_lines,
            }
        } else {
            ResultPreview::Chars {
                shown: truncate_chars(body, self.max_chars).to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPreview {
    Full(String),
    /// First lines only; `remaining` lines were elided.
    Lines { shown: String, remaining: usize },
    /// First `max_chars` characters only.
    Chars { shown: String },
}

/// Prefix of `s` holding at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Format an RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS` in its own offset.
///
/// Anything that does not parse is returned as written.
pub fn format_timestamp(raw: &str) -> String {
    let display = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|dt| dt.format(&display).ok())
        .unwrap_or_else(|| raw.to_string())
}

pub(crate) fn usage_line(usage: &Usage) -> String {
    format!(
        "Tokens: input={}, output={}, cache_read={}",
        usage.input_tokens, usage.output_tokens, usage.cache_read_input_tokens
    )
}
