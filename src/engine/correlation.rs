//! Invocation id -> result lookup.

use std::collections::HashMap;

/// Result payload recorded for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityResult {
    pub body: String,
    pub observed_at: Option<String>,
}

/// First-write-wins map from invocation identifier to its result.
///
/// A second result for an id that is already registered is dropped without
/// a warning; the first body is what every renderer shows.
#[derive(Debug, Clone, Default)]
pub struct CorrelationIndex {
    results: HashMap<String, CapabilityResult>,
}

impl CorrelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a result. Returns `false` if the id was already present.
    pub fn register(
        &mut self,
        invocation_id: impl Into<String>,
        body: String,
        observed_at: Option<String>,
    ) -> bool {
        let invocation_id = invocation_id.into();
        if self.results.contains_key(&invocation_id) {
            return false;
        }
        self.results
            .insert(invocation_id, CapabilityResult { body, observed_at });
        true
    }

    pub fn lookup(&self, invocation_id: &str) -> Option<&CapabilityResult> {
        self.results.get(invocation_id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
