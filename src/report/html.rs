//! Single-file HTML transcript renderer.
//!
//! Produces a standalone HTML document with embedded CSS and JS:
//! - One collapsible card per message (click the header)
//! - Collapsible reasoning sections, collapsed by default
//! - Tool calls with their arguments and correlated results
//! - Expand/collapse-all controls
//!
//! Narrative and reasoning text goes through `markdown_to_html`, which escapes
//! before applying any markup. Tool names, ids, arguments and result bodies
//! are escaped on their own.

use crate::core::message::{Invocation, LogicalMessage, Segment};
use crate::engine::CorrelationIndex;

use super::inline::markdown_to_html;
use super::{ResultPreview, TruncationPolicy, format_timestamp, usage_line};

/// HTML-escape a string for safe insertion into HTML content.
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

const STYLE: &str = r#"<style>
:root {
  --bg: #1a1a2e;
  --surface: #16213e;
  --surface-hover: #1f2b47;
  --text: #e8e8e8;
  --text-muted: #9a9a9a;
  --accent: #4f8cff;
  --green: #4ecdc4;
  --yellow: #ffd93d;
  --border: #2d3a5c;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
  background: var(--bg);
  color: var(--text);
  line-height: 1.6;
  padding: 24px;
}
.container { max-width: 1100px; margin: 0 auto; }
h1 { font-size: 1.75rem; margin-bottom: 8px; }
.header { margin-bottom: 24px; }
.summary { color: var(--text-muted); font-size: 0.875rem; margin-bottom: 12px; }
.controls { display: flex; gap: 8px; }
.control-btn {
  padding: 6px 12px;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 4px;
  color: var(--text-muted);
  font-size: 0.75rem;
  cursor: pointer;
}
.control-btn:hover { border-color: var(--accent); color: var(--text); }

/* Messages */
.message {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 8px;
  margin-bottom: 16px;
  overflow: hidden;
}
.message.user { border-left: 4px solid var(--green); }
.message.assistant { border-left: 4px solid var(--accent); }
.message-header {
  display: flex;
  align-items: center;
  gap: 10px;
  padding: 10px 16px;
  cursor: pointer;
  user-select: none;
  border-bottom: 1px solid var(--border);
}
.message-header:hover { background: var(--surface-hover); }
.role-label { font-weight: 600; }
.timestamp { color: var(--text-muted); font-size: 0.8125rem; font-family: monospace; }
.indicator { margin-left: auto; color: var(--text-muted); transition: transform 0.15s; }
.collapsed > .message-header .indicator { transform: rotate(-90deg); }
.collapsed > .message-body { display: none; }
.message-body { padding: 12px 16px; }
.usage { color: var(--text-muted); font-size: 0.75rem; margin-bottom: 8px; }

/* Narrative */
.narrative { margin: 8px 0; }
.narrative p { margin: 6px 0; }
.narrative h1, .narrative h2, .narrative h3 { margin: 12px 0 6px; }
.narrative ul, .narrative ol { margin: 6px 0 6px 24px; }
.narrative a { color: var(--accent); }
code { font-family: monospace; background: var(--bg); padding: 1px 4px; border-radius: 3px; }
pre {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 4px;
  padding: 10px 12px;
  overflow-x: auto;
  font-size: 0.8125rem;
  white-space: pre-wrap;
  word-break: break-word;
}
pre code { background: none; padding: 0; }

/* Reasoning */
.reasoning { border: 1px dashed var(--border); border-radius: 6px; margin: 8px 0; }
.reasoning-header { padding: 6px 12px; color: var(--yellow); cursor: pointer; user-select: none; font-size: 0.875rem; }
.reasoning-body { padding: 4px 12px 8px; color: var(--text-muted); font-size: 0.875rem; }
.reasoning.collapsed > .reasoning-body { display: none; }

/* Tool calls */
.tool-call { border: 1px solid var(--border); border-radius: 6px; margin: 8px 0; padding: 8px 12px; }
.tool-header { display: flex; gap: 8px; align-items: baseline; margin-bottom: 6px; }
.tool-name { font-weight: 600; font-family: monospace; }
.tool-id { color: var(--text-muted); font-size: 0.75rem; font-family: monospace; }
.tool-result { margin-top: 8px; }
.tool-result-label { color: var(--green); font-size: 0.8125rem; margin-bottom: 4px; }
.truncated-notice { color: var(--yellow); font-size: 0.75rem; font-style: italic; margin-top: 4px; }
.footer { color: var(--text-muted); text-align: center; font-size: 0.875rem; margin-top: 24px; }
</style>"#;

const SCRIPT: &str = r#"<script>
(function () {
  function bindToggles() {
    var toggles = document.querySelectorAll('[data-toggle]');
    for (var i = 0; i < toggles.length; i++) {
      toggles[i].addEventListener('click', function (ev) {
        ev.currentTarget.parentElement.classList.toggle('collapsed');
      });
    }
  }

  function setAll(collapsed) {
    var messages = document.querySelectorAll('.message');
    for (var i = 0; i < messages.length; i++) {
      if (collapsed) {
        messages[i].classList.add('collapsed');
      } else {
        messages[i].classList.remove('collapsed');
      }
    }
  }

  bindToggles();
  document.getElementById('expand-all').addEventListener('click', function () { setAll(false); });
  document.getElementById('collapse-all').addEventListener('click', function () { setAll(true); });
})();
</script>"#;

/// Render messages as a standalone HTML document.
pub fn render_html(messages: &[LogicalMessage], correlation: &CorrelationIndex) -> String {
    let call_count: usize = messages.iter().map(|m| m.invocations().count()).sum();

    let mut html = String::with_capacity(32 * 1024);
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Session Transcript</title>
"#,
    );
    html.push_str(STYLE);
    html.push_str("\n</head>\n<body>\n<div class=\"container\">\n");

    html.push_str("<div class=\"header\">\n<h1>Session Transcript</h1>\n");
    html.push_str(&format!(
        "<div class=\"summary\">{} messages · {} tool calls</div>\n",
        messages.len(),
        call_count
    ));
    html.push_str(
        "<div class=\"controls\">\
<button class=\"control-btn\" id=\"expand-all\">Expand all</button>\
<button class=\"control-btn\" id=\"collapse-all\">Collapse all</button>\
</div>\n</div>\n",
    );

    for (idx, message) in messages.iter().enumerate() {
        render_message(&mut html, idx + 1, message, correlation);
    }

    html.push_str("<div class=\"footer\">End of session</div>\n</div>\n");
    html.push_str(SCRIPT);
    html.push_str("\n</body>\n</html>\n");
    html
}

fn render_message(
    html: &mut String,
    number: usize,
    message: &LogicalMessage,
    correlation: &CorrelationIndex,
) {
    let role = message.role.as_str();
    html.push_str(&format!(
        "<div class=\"message {role}\" id=\"msg-{number}\">\n"
    ));
    html.push_str(&format!(
        "<div class=\"message-header\" data-toggle=\"message\">\
<span class=\"role-icon\">{}</span>\
<span class=\"role-label\">{}</span>\
<span class=\"timestamp\">{}</span>\
<span class=\"indicator\">▾</span></div>\n",
        message.role.icon(),
        message.role.label(),
        html_escape(&format_timestamp(&message.timestamp))
    ));
    html.push_str("<div class=\"message-body\">\n");

    if let Some(usage) = &message.usage {
        html.push_str(&format!(
            "<div class=\"usage\">📊 {}</div>\n",
            html_escape(&usage_line(usage))
        ));
    }

    for part in &message.parts {
        match part {
            Segment::Reasoning(text) => {
                html.push_str("<div class=\"reasoning collapsed\">\n");
                html.push_str(
                    "<div class=\"reasoning-header\" data-toggle=\"reasoning\">💭 Reasoning</div>\n",
                );
                html.push_str(&format!(
                    "<div class=\"reasoning-body\">\n{}\n</div>\n</div>\n",
                    markdown_to_html(text)
                ));
            }
            Segment::Narrative(text) => {
                html.push_str(&format!(
                    "<div class=\"narrative\">\n{}\n</div>\n",
                    markdown_to_html(text)
                ));
            }
            Segment::Invocation(invocation) => render_invocation(html, invocation, correlation),
        }
    }

    html.push_str("</div>\n</div>\n");
}

fn render_invocation(html: &mut String, invocation: &Invocation, correlation: &CorrelationIndex) {
    let id = html_escape(&invocation.id);
    html.push_str("<div class=\"tool-call\">\n");
    html.push_str(&format!(
        "<div class=\"tool-header\"><span class=\"tool-icon\">🔧</span>\
<span class=\"tool-name\">{}</span><span class=\"tool-id\">{}</span></div>\n",
        html_escape(&invocation.name),
        id
    ));

    if !invocation.arguments.is_empty() {
        let args = serde_json::to_string_pretty(&invocation.arguments)
            .unwrap_or_else(|_| "{}".to_string());
        html.push_str(&format!(
            "<pre class=\"tool-args\">{}</pre>\n",
            html_escape(&args)
        ));
    }

    if let Some(result) = correlation.lookup(&invocation.id) {
        html.push_str(&format!(
            "<div class=\"tool-result\" data-tool-id=\"{id}\">\n\
<div class=\"tool-result-label\">📤 Result</div>\n"
        ));
        match TruncationPolicy::MARKUP.apply(&result.body) {
            ResultPreview::Full(body) => {
                html.push_str(&format!(
                    "<pre class=\"tool-result-body\">{}</pre>\n",
                    html_escape(&body)
                ));
            }
            ResultPreview::Lines { shown, remaining } => {
                html.push_str(&format!(
                    "<pre class=\"tool-result-body\">{}</pre>\n",
                    html_escape(&shown)
                ));
                html.push_str(&format!(
                    "<div class=\"truncated-notice lines\">... {remaining} more lines</div>\n"
                ));
            }
            ResultPreview::Chars { shown } => {
                html.push_str(&format!(
                    "<pre class=\"tool-result-body\">{}...</pre>\n",
                    html_escape(&shown)
                ));
                html.push_str(&format!(
                    "<div class=\"truncated-notice chars\">Truncated to {} characters</div>\n",
                    TruncationPolicy::MARKUP.max_chars
                ));
            }
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
}
