//! Event log record schema.
//!
//! One JSON object per line. Only the fields the reconstruction needs are
//! modelled; everything else on a record is ignored.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::message::{Invocation, Segment, Usage};

/// A single event log line, discriminated by its `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum RawEvent {
    #[serde(rename = "user")]
    Participant(TurnRecord),
    #[serde(rename = "assistant")]
    Assistant(TurnRecord),
    #[serde(rename = "queue-operation")]
    Control(ControlRecord),
    /// Record kinds the reconstruction has no use for (summaries, snapshots, ...).
    #[serde(other)]
    Other,
}

impl RawEvent {
    /// Whether this record takes part in reconstruction at all.
    pub fn is_conversational(&self) -> bool {
        matches!(self, RawEvent::Participant(_) | RawEvent::Assistant(_))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<MessageBody>,
}

impl TurnRecord {
    pub fn timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }

    /// Message identity; only assistant turns carry one.
    pub fn identity(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.id.as_deref())
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.message.as_ref().and_then(|m| m.usage.as_ref())
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.message {
            Some(body) => body.content.blocks(),
            None => &[],
        }
    }

    /// Consume the record into its renderable segments, in block order.
    ///
    /// Capability results are not segments; they are picked up by the
    /// correlation index while reading.
    pub fn into_segments(self) -> Vec<Segment> {
        match self.message {
            Some(body) => body
                .content
                .into_blocks()
                .into_iter()
                .filter_map(ContentBlock::into_segment)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: RawContent,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Message content is either a bare string or an array of typed blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Blocks(#[serde(deserialize_with = "lenient_blocks")] Vec<ContentBlock>),
    Text(String),
}

/// Decode blocks one at a time; a block that does not fit any known shape
/// becomes `Unsupported` instead of failing the whole record.
fn lenient_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or(ContentBlock::Unsupported))
        .collect())
}

impl Default for RawContent {
    fn default() -> Self {
        RawContent::Blocks(Vec::new())
    }
}

impl RawContent {
    fn blocks(&self) -> &[ContentBlock] {
        match self {
            RawContent::Blocks(blocks) => blocks,
            RawContent::Text(_) => &[],
        }
    }

    fn into_blocks(self) -> Vec<ContentBlock> {
        match self {
            RawContent::Blocks(blocks) => blocks,
            RawContent::Text(text) if text.is_empty() => Vec::new(),
            RawContent::Text(text) => vec![ContentBlock::Text { text }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: ResultContent,
    },
    // images, documents, redacted thinking
    #[serde(other)]
    Unsupported,
}

impl ContentBlock {
    pub fn into_segment(self) -> Option<Segment> {
        match self {
            ContentBlock::Text { text } => Some(Segment::Narrative(text)),
            ContentBlock::Thinking { thinking } => Some(Segment::Reasoning(thinking)),
            ContentBlock::ToolUse { id, name, input } => Some(Segment::Invocation(Invocation {
                id,
                name: if name.is_empty() { "Unknown".to_string() } else { name },
                arguments: into_arguments(input),
            })),
            ContentBlock::ToolResult { .. } | ContentBlock::Unsupported => None,
        }
    }
}

fn into_arguments(input: Value) -> Map<String, Value> {
    match input {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("input".to_string(), other);
            map
        }
    }
}

/// Capability result body: a string, a list of text parts, or anything else.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResultContent {
    Text(String),
    Parts(Vec<ResultPart>),
    Other(Value),
}

impl Default for ResultContent {
    fn default() -> Self {
        ResultContent::Text(String::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl ResultContent {
    /// Flatten the body to plain text. Non-text parts are dropped.
    pub fn to_text(&self) -> String {
        match self {
            ResultContent::Text(text) => text.clone(),
            ResultContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
            ResultContent::Other(Value::Null) => String::new(),
            ResultContent::Other(value) => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> RawEvent {
        serde_json::from_str(line).expect("line should parse")
    }

    #[test]
    fn test_parse_assistant_with_blocks() {
        let event = parse(
            r#"{"type":"assistant","timestamp":"2025-01-01T00:00:00Z","message":{"id":"m1","content":[{"type":"thinking","thinking":"hmm"},{"type":"text","text":"hi"}],"usage":{"input_tokens":3,"output_tokens":4}}}"#,
        );
        let RawEvent::Assistant(record) = event else {
            panic!("expected assistant record");
        };
        assert_eq!(record.identity(), Some("m1"));
        assert_eq!(record.timestamp(), "2025-01-01T00:00:00Z");
        assert_eq!(record.usage().map(|u| u.output_tokens), Some(4));
        let segments = record.into_segments();
        assert_eq!(
            segments,
            vec![
                Segment::Reasoning("hmm".to_string()),
                Segment::Narrative("hi".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_string_content_as_narrative() {
        let event = parse(r#"{"type":"user","message":{"role":"user","content":"plain"}}"#);
        let RawEvent::Participant(record) = event else {
            panic!("expected participant record");
        };
        assert_eq!(record.timestamp(), "");
        assert_eq!(record.into_segments(), vec![Segment::Narrative("plain".to_string())]);
    }

    #[test]
    fn test_control_and_unknown_kinds() {
        assert!(matches!(
            parse(r#"{"type":"queue-operation","operation":"enqueue"}"#),
            RawEvent::Control(_)
        ));
        assert!(matches!(
            parse(r#"{"type":"summary","summary":"x"}"#),
            RawEvent::Other
        ));
        assert!(serde_json::from_str::<RawEvent>(r#"{"no_type":true}"#).is_err());
    }

    #[test]
    fn test_tool_use_preserves_argument_order() {
        let event = parse(
            r#"{"type":"assistant","message":{"id":"m","content":[{"type":"tool_use","id":"t1","name":"Edit","input":{"zeta":1,"alpha":"a","mid":true}}]}}"#,
        );
        let RawEvent::Assistant(record) = event else {
            panic!("expected assistant record");
        };
        let segments = record.into_segments();
        let Segment::Invocation(invocation) = &segments[0] else {
            panic!("expected invocation");
        };
        let keys: Vec<&str> = invocation.arguments.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_tool_use_missing_name_defaults() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"type":"tool_use","id":"t","input":null}"#).unwrap();
        let Some(Segment::Invocation(invocation)) = block.into_segment() else {
            panic!("expected invocation");
        };
        assert_eq!(invocation.name, "Unknown");
        assert!(invocation.arguments.is_empty());
    }

    #[test]
    fn test_result_content_shapes() {
        let text: ResultContent = serde_json::from_str(r#""done""#).unwrap();
        assert_eq!(text.to_text(), "done");

        let parts: ResultContent =
            serde_json::from_str(r#"[{"type":"text","text":"a"},{"type":"image"},{"type":"text","text":"b"}]"#)
                .unwrap();
        assert_eq!(parts.to_text(), "a\nb");

        let other: ResultContent = serde_json::from_str(r#"{"k":1}"#).unwrap();
        assert_eq!(other.to_text(), r#"{"k":1}"#);
    }

    #[test]
    fn test_malformed_block_does_not_lose_record() {
        let event = parse(
            r#"{"type":"user","message":{"content":[{"text":"untyped"},{"type":"text","text":null},{"type":"tool_result","tool_use_id":"t1","content":"kept"},{"type":"text","text":"ok"}]}}"#,
        );
        let RawEvent::Participant(record) = event else {
            panic!("expected participant record");
        };
        assert_eq!(record.blocks().len(), 4);
        assert!(matches!(record.blocks()[0], ContentBlock::Unsupported));
        assert!(matches!(record.blocks()[1], ContentBlock::Unsupported));
        assert!(matches!(
            &record.blocks()[2],
            ContentBlock::ToolResult { tool_use_id: Some(id), .. } if id == "t1"
        ));
        assert_eq!(record.into_segments(), vec![Segment::Narrative("ok".to_string())]);
    }

    #[test]
    fn test_unsupported_blocks_are_dropped() {
        let event = parse(
            r#"{"type":"user","message":{"content":[{"type":"image","source":{}},{"type":"tool_result","tool_use_id":"t","content":"x"}]}}"#,
        );
        let RawEvent::Participant(record) = event else {
            panic!("expected participant record");
        };
        assert_eq!(record.blocks().len(), 2);
        assert!(record.into_segments().is_empty());
    }
}
