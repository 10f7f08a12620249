use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::conversation::ConversationController;
use crate::events::ToolKind;
use crate::llm::TextGenerator;
use crate::tools::ToolProfile;

/// Host for the active tool: owns its controller, handles tool switches and
/// "new chat", and remembers whether any result has been produced.
pub struct Session {
    config: Config,
    generator: Arc<dyn TextGenerator>,
    controller: ConversationController,
    has_result: Arc<AtomicBool>,
}

impl Session {
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let has_result = Arc::new(AtomicBool::new(false));
        let controller = Self::build_controller(&config, config.default_tool, &generator, &has_result);

        Self {
            config,
            generator,
            controller,
            has_result,
        }
    }

    fn build_controller(
        config: &Config,
        kind: ToolKind,
        generator: &Arc<dyn TextGenerator>,
        has_result: &Arc<AtomicBool>,
    ) -> ConversationController {
        let flag = Arc::clone(has_result);
        ConversationController::new(ToolProfile::for_tool(kind, &config.reveal), Arc::clone(generator))
            .with_observer(move |_| flag.store(true, Ordering::SeqCst))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn active_tool(&self) -> ToolKind {
        self.controller.kind()
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ConversationController {
        &mut self.controller
    }

    /// Whether any submission has been made since the last new chat
    pub fn has_result(&self) -> bool {
        self.has_result.load(Ordering::SeqCst)
    }

    /// Activate another tool. The previous tool's conversation is discarded.
    /// Returns `false` if `kind` was already active.
    pub fn switch_tool(&mut self, kind: ToolKind) -> bool {
        if kind == self.active_tool() {
            return false;
        }

        tracing::info!(from = %self.active_tool().as_ref(), to = %kind.as_ref(), "switching tool");
        self.controller.reset();
        self.controller = Self::build_controller(&self.config, kind, &self.generator, &self.has_result);
        true
    }

    /// Start over: empty conversation, idle controller, no result shown
    pub fn new_chat(&mut self) {
        self.controller.reset();
        self.has_result.store(false, Ordering::SeqCst);
    }

    pub fn submit(&mut self, input: &str) -> bool {
        self.controller.submit(input)
    }

    /// Summarize already-extracted document text, switching to the
    /// document tool first if another tool is active.
    pub fn submit_document(&mut self, name: &str, text: &str) -> bool {
        self.switch_tool(ToolKind::Pdf);
        self.controller.submit_with_source(text, Some(name.to_string()))
    }
}
