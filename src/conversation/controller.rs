use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::conversation::history::{Conversation, Exchange};
use crate::conversation::reveal::{self, RevealState};
use crate::error::{LlmError, SubmissionFailure};
use crate::events::{ControllerEvent, ConversationUpdate, SubmissionState, ToolKind};
use crate::llm::TextGenerator;
use crate::tools::ToolProfile;

const EVENT_BUFFER: usize = 32;

/// Aborts the wrapped task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Called once per accepted submission, signalling that a result now exists.
pub type ResultObserver = Box<dyn FnMut(ToolKind) + Send>;

/// Drives one tool's conversation: submission, request, reveal, history.
///
/// The controller is the only owner of its conversation. The request and the
/// reveal ticker run as background tasks that report back through a channel;
/// nothing changes until the owner pumps events with [`next_update`],
/// [`poll_updates`] or [`run_until_idle`].
///
/// [`next_update`]: ConversationController::next_update
/// [`poll_updates`]: ConversationController::poll_updates
/// [`run_until_idle`]: ConversationController::run_until_idle
pub struct ConversationController {
    profile: ToolProfile,
    generator: Arc<dyn TextGenerator>,
    conversation: Conversation,
    state: SubmissionState,
    generation: u64,
    reveal: Option<RevealState>,
    pending_source: Option<String>,
    last_failure: Option<SubmissionFailure>,
    event_tx: mpsc::Sender<ControllerEvent>,
    event_rx: mpsc::Receiver<ControllerEvent>,
    request_task: Option<JoinHandle<()>>,
    reveal_task: Option<JoinHandle<()>>,
    on_result: Option<ResultObserver>,
}

impl ConversationController {
    pub fn new(profile: ToolProfile, generator: Arc<dyn TextGenerator>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

        Self {
            profile,
            generator,
            conversation: Conversation::new(),
            state: SubmissionState::Idle,
            generation: 0,
            reveal: None,
            pending_source: None,
            last_failure: None,
            event_tx,
            event_rx,
            request_task: None,
            reveal_task: None,
            on_result: None,
        }
    }

    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(ToolKind) + Send + 'static,
    {
        self.on_result = Some(Box::new(observer));
        self
    }

    pub fn kind(&self) -> ToolKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &ToolProfile {
        &self.profile
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Input should only be offered while this is true
    pub fn can_submit(&self) -> bool {
        self.state.is_idle()
    }

    /// Failure recorded by the most recent submission, if it failed
    pub fn last_failure(&self) -> Option<SubmissionFailure> {
        self.last_failure
    }

    /// Text currently visible for the last exchange
    pub fn displayed_text(&self) -> &str {
        match &self.reveal {
            Some(reveal) => reveal.shown(),
            None => self.conversation.last().map(Exchange::response).unwrap_or(""),
        }
    }

    /// Submit user input. Returns `false` when nothing was submitted: a
    /// previous submission that has not reached `Idle` yet, or blank input
    /// (recorded as [`SubmissionFailure::EmptyInput`]).
    pub fn submit(&mut self, input: &str) -> bool {
        self.submit_with_source(input, None)
    }

    /// Like [`submit`](Self::submit), with a source label (e.g. a file name)
    /// recorded as the exchange metadata when the reply carries none.
    pub fn submit_with_source(&mut self, input: &str, source: Option<String>) -> bool {
        if !self.state.is_idle() {
            tracing::warn!(tool = %self.profile.kind.as_ref(), state = ?self.state, "submission rejected while a reply is pending");
            return false;
        }
        let prompt = input.trim();
        if prompt.is_empty() {
            tracing::debug!(tool = %self.profile.kind.as_ref(), "ignoring blank submission");
            self.last_failure = Some(SubmissionFailure::EmptyInput);
            return false;
        }

        self.generation += 1;
        self.conversation.push(Exchange::new(prompt));
        self.pending_source = source;
        self.last_failure = None;
        self.state = SubmissionState::AwaitingResponse;

        let kind = self.profile.kind;
        if let Some(observer) = self.on_result.as_mut() {
            observer(kind);
        }

        let request = (self.profile.format_prompt)(prompt);
        let generator = Arc::clone(&self.generator);
        let tx = self.event_tx.clone();
        let generation = self.generation;

        tracing::info!(tool = %kind.as_ref(), generation, "dispatching request");
        self.request_task = Some(tokio::spawn(async move {
            // The call runs in its own task so a panic still yields a reply.
            let mut call = AbortOnDrop(tokio::spawn(async move { generator.generate(&request).await }));
            let outcome = (&mut call.0).await.unwrap_or_else(|e| Err(LlmError::from(e)));
            let _ = tx.send(ControllerEvent::Reply { generation, outcome }).await;
        }));

        true
    }

    /// Discard the conversation and anything in flight. Safe in any state.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.abort_tasks();
        self.reveal = None;
        self.pending_source = None;
        self.last_failure = None;
        self.conversation.clear();
        self.state = SubmissionState::Idle;

        // Anything still queued belongs to an older generation.
        while self.event_rx.try_recv().is_ok() {}

        tracing::debug!(tool = %self.profile.kind.as_ref(), generation = self.generation, "conversation reset");
    }

    /// Wait for and apply the next event. Returns `None` once the controller is idle.
    pub async fn next_update(&mut self) -> Option<ConversationUpdate> {
        while !self.state.is_idle() {
            let event = self.event_rx.recv().await?;
            if let Some(update) = self.handle_event(event) {
                return Some(update);
            }
        }
        None
    }

    /// Apply every event that is already queued, without waiting
    pub fn poll_updates(&mut self) -> Vec<ConversationUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            if let Some(update) = self.handle_event(event) {
                updates.push(update);
            }
        }
        updates
    }

    /// Drive the current submission until the controller is idle again
    pub async fn run_until_idle(&mut self) {
        while self.next_update().await.is_some() {}
    }

    fn handle_event(&mut self, event: ControllerEvent) -> Option<ConversationUpdate> {
        if event.generation() != self.generation {
            tracing::debug!(
                event_generation = event.generation(),
                current = self.generation,
                "dropping stale event"
            );
            return None;
        }

        match event {
            ControllerEvent::Reply { outcome, .. } => {
                self.request_task = None;
                if self.state != SubmissionState::AwaitingResponse {
                    return None;
                }
                match outcome {
                    Ok(Some(raw)) => {
                        let parsed = (self.profile.parse_reply)(&raw);
                        if parsed.degraded {
                            tracing::warn!(
                                tool = %self.profile.kind.as_ref(),
                                failure = SubmissionFailure::UnparseableReply.label(),
                                "reply did not follow the expected format"
                            );
                        }
                        Some(self.begin_reveal(parsed.text, parsed.metadata))
                    }
                    Ok(None) => {
                        tracing::warn!(tool = %self.profile.kind.as_ref(), "service returned no usable text");
                        Some(self.fail(SubmissionFailure::EmptyReply))
                    }
                    Err(e) => {
                        tracing::warn!(tool = %self.profile.kind.as_ref(), error = %e, "request failed");
                        Some(self.fail(SubmissionFailure::TransportFailure))
                    }
                }
            }
            ControllerEvent::RevealTick { .. } => self.advance_reveal(),
        }
    }

    fn begin_reveal(&mut self, text: String, metadata: Option<String>) -> ConversationUpdate {
        let metadata = metadata.or_else(|| self.pending_source.take());
        let reveal = RevealState::new(text, metadata);
        let total = reveal.total_chars();
        let complete = reveal.is_complete();
        self.reveal = Some(reveal);

        if complete {
            return self.finish_reveal();
        }

        self.state = SubmissionState::Revealing;
        self.reveal_task = Some(reveal::spawn_ticker(
            self.event_tx.clone(),
            self.generation,
            self.profile.reveal_interval,
        ));

        ConversationUpdate::RevealProgress { shown: 0, total }
    }

    fn advance_reveal(&mut self) -> Option<ConversationUpdate> {
        let reveal = self.reveal.as_mut()?;
        reveal.advance();
        if reveal.is_complete() {
            Some(self.finish_reveal())
        } else {
            Some(ConversationUpdate::RevealProgress {
                shown: reveal.shown_chars(),
                total: reveal.total_chars(),
            })
        }
    }

    fn finish_reveal(&mut self) -> ConversationUpdate {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
        let (response, metadata) = self
            .reveal
            .take()
            .map(RevealState::into_parts)
            .unwrap_or_default();

        self.conversation.update_last(|exchange| {
            exchange.set_response(response.clone());
            exchange.set_metadata(metadata.clone());
        });
        self.pending_source = None;
        self.state = SubmissionState::Idle;

        tracing::info!(tool = %self.profile.kind.as_ref(), chars = response.chars().count(), "reply revealed");
        ConversationUpdate::Completed { response, metadata }
    }

    fn fail(&mut self, failure: SubmissionFailure) -> ConversationUpdate {
        let response = match failure {
            SubmissionFailure::EmptyReply => self.profile.empty_reply_text,
            _ => self.profile.failure_text,
        };

        self.conversation.update_last(|exchange| exchange.set_response(response));
        self.pending_source = None;
        self.last_failure = Some(failure);
        self.state = SubmissionState::Idle;

        ConversationUpdate::Failed {
            failure,
            response: response.to_string(),
        }
    }

    fn abort_tasks(&mut self) {
        if let Some(task) = self.request_task.take() {
            task.abort();
        }
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
    }
}

impl Drop for ConversationController {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
