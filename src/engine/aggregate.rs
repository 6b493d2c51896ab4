//! Folds raw events into ordered logical messages.

use std::collections::HashMap;

use tracing::debug;

use crate::core::message::LogicalMessage;
use crate::core::schema::RawEvent;

/// Group events into logical messages.
///
/// Assistant events sharing a message identity are folded into one message
/// by appending their segments in read order; the first event fixes the
/// message timestamp and the last event carrying usage fixes its usage.
/// Participant events become standalone messages unless they hold nothing
/// renderable (e.g. only capability results).
///
/// The result is stably sorted by the raw timestamp string. Among equal
/// timestamps, assistant messages (in first-seen order) precede participant
/// messages (in read order).
pub fn aggregate(events: Vec<RawEvent>) -> Vec<LogicalMessage> {
    let mut assistant: Vec<LogicalMessage> = Vec::new();
    let mut by_identity: HashMap<String, usize> = HashMap::new();
    let mut participant: Vec<LogicalMessage> = Vec::new();

    for event in events {
        match event {
            RawEvent::Assistant(record) => {
                let Some(identity) = record.identity().map(str::to_string) else {
                    debug!("assistant record without message id dropped");
                    continue;
                };
                let usage = record.usage().cloned();
                let slot = match by_identity.get(&identity) {
                    Some(&slot) => slot,
                    None => {
                        assistant.push(LogicalMessage::assistant(
                            identity.clone(),
                            record.timestamp().to_string(),
                            None,
                        ));
                        by_identity.insert(identity, assistant.len() - 1);
                        assistant.len() - 1
                    }
                };
                let message = &mut assistant[slot];
                if usage.is_some() {
                    message.usage = usage;
                }
                message.parts.extend(record.into_segments());
            }
            RawEvent::Participant(record) => {
                let timestamp = record.timestamp().to_string();
                let parts = record.into_segments();
                if !parts.is_empty() {
                    participant.push(LogicalMessage::participant(timestamp, parts));
                }
            }
            RawEvent::Control(_) | RawEvent::Other => {}
        }
    }

    let mut messages = assistant;
    messages.extend(participant);
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    messages
}
