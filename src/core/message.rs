//! Reassembled message model consumed by the renderers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Participant,
    Assistant,
}

impl Role {
    pub fn icon(&self) -> &'static str {
        match self {
            Role::Participant => "👤",
            Role::Assistant => "🤖",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Participant => "User",
            Role::Assistant => "Assistant",
        }
    }

    /// Stable lowercase name, used for CSS classes and anchors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Participant => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Token accounting attached to assistant turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

/// A capability call made by the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub id: String,
    pub name: String,
    /// Arguments in the order they appeared in the record.
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Reasoning(String),
    Narrative(String),
    Invocation(Invocation),
}

/// One reconstructed message, possibly folded from several records.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalMessage {
    pub role: Role,
    /// Timestamp of the earliest contributing record, as written in the log.
    pub timestamp: String,
    /// Message identity; `None` for participant messages.
    pub identity: Option<String>,
    pub parts: Vec<Segment>,
    pub usage: Option<Usage>,
}

impl LogicalMessage {
    pub fn participant(timestamp: String, parts: Vec<Segment>) -> Self {
        LogicalMessage {
            role: Role::Participant,
            timestamp,
            identity: None,
            parts,
            usage: None,
        }
    }

    pub fn assistant(identity: String, timestamp: String, usage: Option<Usage>) -> Self {
        LogicalMessage {
            role: Role::Assistant,
            timestamp,
            identity: Some(identity),
            parts: Vec::new(),
            usage,
        }
    }

    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.parts.iter().filter_map(|part| match part {
            Segment::Invocation(invocation) => Some(invocation),
            Segment::Reasoning(_) | Segment::Narrative(_) => None,
        })
    }
}
