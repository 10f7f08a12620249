//! Conversation history: the ordered exchanges of one tool session

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One prompt and its response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    prompt: String,
    response: String,
    metadata: Option<String>,
    created_at: DateTime<Utc>,
}

impl Exchange {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: String::new(),
            metadata: None,
            created_at: Utc::now(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Final response; empty while the exchange is in progress
    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_complete(&self) -> bool {
        !self.response.is_empty()
    }

    pub fn set_response(&mut self, response: impl Into<String>) {
        self.response = response.into();
    }

    pub fn set_metadata(&mut self, metadata: Option<String>) {
        self.metadata = metadata;
    }
}

/// Append-only list of exchanges; only the last one may change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    exchanges: Vec<Exchange>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    /// Apply `update` to the last exchange. Returns `false` on an empty conversation.
    pub fn update_last<F>(&mut self, update: F) -> bool
    where
        F: FnOnce(&mut Exchange),
    {
        match self.exchanges.last_mut() {
            Some(last) => {
                update(last);
                true
            }
            None => false,
        }
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Plain-text transcript, oldest exchange first
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for exchange in &self.exchanges {
            let timestamp = exchange.created_at.format("%H:%M:%S");
            out.push_str(&format!("[{timestamp}] You: {}\n", exchange.prompt));
            if let Some(meta) = exchange.metadata() {
                out.push_str(&format!("  ({meta})\n"));
            }
            if exchange.is_complete() {
                out.push_str(&exchange.response);
            } else {
                out.push_str("...");
            }
            out.push_str("\n\n");
        }
        out
    }
}
