//! Markdown-subset to HTML conversion for narrative text.
//!
//! Supported: fenced code, inline code, bold, italic, `#`..`###` headings,
//! links, bullet and numbered lists, paragraphs. Everything else is shown as
//! escaped text.
//!
//! Code is lifted out into placeholder tokens before any other rule runs and
//! put back only after paragraphs are built, so emphasis, list and paragraph
//! rules never see code content. Tokens are delimited by the private-use
//! characters U+E000/U+E001, which escaping removes from the input.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::html::html_escape;

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';
const CODE_BLOCK_TAG: char = 'B';
const INLINE_CODE_TAG: char = 'C';

/// Tags that mark a paragraph as already block-level.
const BLOCK_TAGS: &[&str] = &[
    "<h1", "<h2", "<h3", "<ul", "<ol", "<pre", "<p>", "<div", "<table", "<blockquote", "<hr",
];

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("valid markup regex"))
        }
    };
}

cached_regex!(fenced_code_re, r"(?s)```([\w+#.-]*)\n(.*?)```");
cached_regex!(inline_code_re, r"`([^`\n]+)`");
cached_regex!(bold_star_re, r"\*\*(.+?)\*\*");
cached_regex!(bold_underscore_re, r"\b__(.+?)__\b");
cached_regex!(italic_star_re, r"\*([^\s*](?:[^*\n]*[^\s*])?)\*");
cached_regex!(italic_underscore_re, r"\b_([^\s_](?:[^_\n]*[^\s_])?)_\b");
cached_regex!(h3_re, r"(?m)^### (.+)$");
cached_regex!(h2_re, r"(?m)^## (.+)$");
cached_regex!(h1_re, r"(?m)^# (.+)$");
cached_regex!(link_re, r"\[([^\]\n]+)\]\(([^)\s]+)\)");
cached_regex!(bullet_re, r"^\s*[-*+]\s+(.+)$");
cached_regex!(numbered_re, r"^\s*\d+\.\s+(.+)$");
cached_regex!(paragraph_break_re, r"\n[ \t]*\n");
cached_regex!(code_block_token_re, r"\x{E000}B(\d+)\x{E001}");
cached_regex!(inline_code_token_re, r"\x{E000}C(\d+)\x{E001}");

/// Convert markdown-subset text into an HTML fragment.
///
/// Never fails: unterminated fences or code spans are left as literal text.
pub fn markdown_to_html(text: &str) -> String {
    let mut code_blocks: Vec<String> = Vec::new();
    let mut inline_codes: Vec<String> = Vec::new();

    let escaped = escape_text(text);

    let html = fenced_code_re().replace_all(&escaped, |caps: &Captures| {
        let lang = &caps[1];
        let code = caps[2].strip_suffix('\n').unwrap_or(&caps[2]);
        let block = if lang.is_empty() {
            format!("<pre><code>{code}</code></pre>")
        } else {
            format!("<pre><code class=\"language-{lang}\">{code}</code></pre>")
        };
        code_blocks.push(block);
        token(CODE_BLOCK_TAG, code_blocks.len() - 1)
    });

    let html = inline_code_re().replace_all(&html, |caps: &Captures| {
        inline_codes.push(format!("<code>{}</code>", &caps[1]));
        token(INLINE_CODE_TAG, inline_codes.len() - 1)
    });

    let html = bold_star_re().replace_all(&html, "<strong>$1</strong>");
    let html = bold_underscore_re().replace_all(&html, "<strong>$1</strong>");
    let html = italic_star_re().replace_all(&html, "<em>$1</em>");
    let html = italic_underscore_re().replace_all(&html, "<em>$1</em>");

    let html = h3_re().replace_all(&html, "<h3>$1</h3>");
    let html = h2_re().replace_all(&html, "<h2>$1</h2>");
    let html = h1_re().replace_all(&html, "<h1>$1</h1>");

    let html = link_re().replace_all(&html, |caps: &Captures| {
        let (label, url) = (&caps[1], &caps[2]);
        if is_safe_url(url) {
            format!("<a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>")
        } else {
            caps[0].to_string()
        }
    });

    let html = collapse_lists(&html);
    let html = wrap_paragraphs(&html);

    let html = code_block_token_re().replace_all(&html, |caps: &Captures| {
        resolve(&code_blocks, &caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    let html = inline_code_token_re().replace_all(&html, |caps: &Captures| {
        resolve(&inline_codes, &caps[1]).unwrap_or_else(|| caps[0].to_string())
    });

    html.into_owned()
}

/// HTML-escape, and keep the placeholder delimiters out of the text.
fn escape_text(text: &str) -> String {
    html_escape(text)
        .replace(TOKEN_OPEN, "&#xE000;")
        .replace(TOKEN_CLOSE, "&#xE001;")
}

fn token(tag: char, index: usize) -> String {
    format!("{TOKEN_OPEN}{tag}{index}{TOKEN_CLOSE}")
}

fn resolve(table: &[String], index: &str) -> Option<String> {
    index.parse::<usize>().ok().and_then(|i| table.get(i)).cloned()
}

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Only `http`, `https`, `mailto` and scheme-less (relative) URLs are linked.
///
/// The URL is normalised the way browsers parse `href` before the scheme is
/// read: C0 controls and spaces are trimmed from both ends and tab, LF and CR
/// are removed everywhere.
fn is_safe_url(url: &str) -> bool {
    let normalised: String = url
        .trim_matches(|c: char| c <= '\u{20}')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();

    let scheme_end = normalised.find([':', '/', '?', '#']);
    match scheme_end {
        Some(idx) if normalised[idx..].starts_with(':') => {
            let scheme = normalised[..idx].to_ascii_lowercase();
            ALLOWED_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn open_tag(&self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>",
            ListKind::Ordered => "<ol>",
        }
    }

    fn close_tag(&self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>",
            ListKind::Ordered => "</ol>",
        }
    }
}

/// Fold runs of bullet or numbered lines into list blocks.
///
/// Each list is set off by blank lines so it becomes its own paragraph.
fn collapse_lists(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut open: Option<ListKind> = None;

    for line in text.split('\n') {
        let item = if let Some(caps) = bullet_re().captures(line) {
            Some((ListKind::Unordered, caps[1].to_string()))
        } else {
            numbered_re()
                .captures(line)
                .map(|caps| (ListKind::Ordered, caps[1].to_string()))
        };

        match item {
            Some((kind, content)) => {
                if open != Some(kind) {
                    if let Some(prev) = open.take() {
                        out.push(prev.close_tag().to_string());
                    }
                    out.push(String::new());
                    out.push(kind.open_tag().to_string());
                    open = Some(kind);
                }
                out.push(format!("<li>{content}</li>"));
            }
            None => {
                if let Some(prev) = open.take() {
                    out.push(prev.close_tag().to_string());
                    out.push(String::new());
                }
                out.push(line.to_string());
            }
        }
    }

    if let Some(prev) = open {
        out.push(prev.close_tag().to_string());
    }
    out.join("\n")
}

fn wrap_paragraphs(text: &str) -> String {
    let block_marker = format!("{TOKEN_OPEN}{CODE_BLOCK_TAG}");
    paragraph_break_re()
        .split(text)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            if BLOCK_TAGS.iter().any(|tag| chunk.starts_with(tag)) || chunk.contains(&block_marker)
            {
                chunk.to_string()
            } else {
                format!("<p>{}</p>", chunk.replace('\n', "<br>\n"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
