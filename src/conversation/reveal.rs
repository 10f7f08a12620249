use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::ControllerEvent;

/// Character-by-character view over a reply that is already fully received
#[derive(Debug, Clone)]
pub struct RevealState {
    full_text: String,
    /// Byte offset of the end of the visible prefix; always on a char boundary
    cursor: usize,
    shown_chars: usize,
    total_chars: usize,
    metadata: Option<String>,
}

impl RevealState {
    pub fn new(full_text: impl Into<String>, metadata: Option<String>) -> Self {
        let full_text = full_text.into();
        let total_chars = full_text.chars().count();
        Self {
            full_text,
            cursor: 0,
            shown_chars: 0,
            total_chars,
            metadata,
        }
    }

    /// Make one more character visible. Returns `false` once everything is shown.
    pub fn advance(&mut self) -> bool {
        match self.full_text[self.cursor..].chars().next() {
            Some(ch) => {
                self.cursor += ch.len_utf8();
                self.shown_chars += 1;
                true
            }
            None => false,
        }
    }

    pub fn shown(&self) -> &str {
        &self.full_text[..self.cursor]
    }

    pub fn shown_chars(&self) -> usize {
        self.shown_chars
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.full_text.len()
    }

    pub fn into_parts(self) -> (String, Option<String>) {
        (self.full_text, self.metadata)
    }
}

/// Spawn the ticker that paces a reveal.
///
/// Sends one `RevealTick` per `interval` until the receiver is gone or the
/// task is aborted. Ticks carry `generation` so the controller can ignore
/// them after a reset.
pub(crate) fn spawn_ticker(
    tx: mpsc::Sender<ControllerEvent>,
    generation: u64,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            if tx.send(ControllerEvent::RevealTick { generation }).await.is_err() {
                break;
            }
        }
    })
}
