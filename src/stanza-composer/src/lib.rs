//! Stanza Composer - budget-aware prompt composition.
//!
//! This crate assembles the system/user messages sent to a language model
//! from conversation history, tool results, workspace state, and user
//! instructions. It handles:
//!
//! - **Fragment composition**: a per-turn tree of prompt fragments gated by
//!   capability predicates (see [`policy`] and [`sections`])
//! - **Budget allocation**: priority-ordered inclusion, growth-weighted
//!   leftover distribution, and silent dropping (see [`budget`])
//! - **Cache segmentation**: breakpoint markers at stable seams so a
//!   downstream cache can reuse prompt prefixes (see [`segmenter`])
//! - **Turn freezing**: write-once replay of rendered messages and the
//!   global workspace snapshot (see [`freezer`])
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        PromptComposer                            │
//! │  ┌────────────┐   ┌──────────────┐   ┌───────────────────────┐   │
//! │  │ TurnFreezer│   │   Services   │   │  Policy / Sections    │   │
//! │  │ (replay)   │   │  (fan-out)   │   │  (fragment tree)      │   │
//! │  └─────┬──────┘   └──────┬───────┘   └──────────┬────────────┘   │
//! │        │                 │                      │                │
//! │        ▼                 ▼                      ▼                │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │               BudgetAllocator → CacheSegmenter             │  │
//! │  │  • priority-ordered inclusion and silent dropping          │  │
//! │  │  • growth-weighted leftover distribution                   │  │
//! │  │  • breakpoints after global context and the user message   │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use stanza_composer::{ComposerConfig, PromptComposer, RenderRequest, Services};
//! use stanza_protocol::{AvailableTools, Conversation, ModelEndpoint, ToolName, Turn};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(services: Services) -> stanza_composer::Result<()> {
//! let composer = PromptComposer::new(ComposerConfig::default(), services);
//!
//! let mut conversation = Conversation::new();
//! conversation.push_turn(Turn::new("add a retry to the fetch helper"));
//!
//! let endpoint = ModelEndpoint::new("gpt-5-codex", "gpt", 128_000);
//! let tools = AvailableTools::from_tools(&[ToolName::EditFile, ToolName::RunInTerminal]);
//!
//! let outcome = composer
//!     .render(
//!         &mut conversation,
//!         RenderRequest::new(&endpoint, &tools),
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! for message in &outcome.messages {
//!     println!("{:?}: {}", message.role, message.visible_text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod config;
pub mod context;
pub mod fragment;
pub mod freezer;
pub mod policy;
pub mod prompts;
pub mod sections;
pub mod segmenter;
pub mod services;

// Re-exports
pub use budget::{AllocationOutcome, RenderedBlock, allocate};
pub use config::ComposerConfig;
pub use context::{
    EditorContext, NotebookContext, PullRequest, RepoContext, WorkspaceSnapshot, WorkspaceTask,
};
pub use fragment::{BlockKind, Fragment, FragmentContent};
pub use policy::Capabilities;
pub use services::{
    GitService, ServiceError, ServiceResult, Services, TaskService, WorkspaceService,
};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use stanza_protocol::{AvailableTools, Conversation, Message, ModelEndpoint};

/// Errors surfaced by the composer.
///
/// Data absence is never an error in this layer; every no-data case silently
/// omits its fragment instead.
#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("conversation has no turns to render")]
    EmptyConversation,
    #[error("render cancelled by caller")]
    Cancelled,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("tool reference does not resolve to an available tool: {0}")]
    ToolResolution(String),
}

/// Result type for composer operations.
pub type Result<T> = std::result::Result<T, ComposerError>;

/// Per-render inputs supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub endpoint: &'a ModelEndpoint,
    pub tools: &'a AvailableTools,
    /// Conversation summary, used only when summarization is enabled.
    pub summary: Option<&'a str>,
    /// Extra instructions appended to the base system prompt.
    pub custom_instructions: Option<&'a str>,
}

impl<'a> RenderRequest<'a> {
    pub fn new(endpoint: &'a ModelEndpoint, tools: &'a AvailableTools) -> Self {
        Self {
            endpoint,
            tools,
            summary: None,
            custom_instructions: None,
        }
    }

    pub fn with_summary(mut self, summary: &'a str) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_custom_instructions(mut self, instructions: &'a str) -> Self {
        self.custom_instructions = Some(instructions);
        self
    }
}

/// The result of one render pass.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Role-tagged messages ready for submission.
    pub messages: Vec<Message>,
    /// The token budget the render was given.
    pub budget: usize,
    /// Estimated tokens across all rendered content.
    pub tokens_used: usize,
    /// Fragments dropped to fit the budget.
    pub dropped_fragments: usize,
}

/// The main entry point for prompt composition.
pub struct PromptComposer {
    config: ComposerConfig,
    services: Services,
}

impl PromptComposer {
    pub fn new(config: ComposerConfig, services: Services) -> Self {
        Self { config, services }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Render the conversation into messages for the given endpoint.
    ///
    /// One logical pass: freezer checks gate the service fan-out, sibling
    /// queries join before allocation, and the caller's cancellation token
    /// aborts the whole render. The first render attaches the rendered user
    /// message and global-context snapshot to turn metadata; later renders
    /// replay them verbatim, except that cache breakpoints are recomputed
    /// for the current turn only.
    pub async fn render(
        &self,
        conversation: &mut Conversation,
        request: RenderRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<RenderOutcome> {
        if cancel.is_cancelled() {
            return Err(ComposerError::Cancelled);
        }
        let Some(current) = conversation.current_turn() else {
            return Err(ComposerError::EmptyConversation);
        };
        debug!(
            model = %request.endpoint.model,
            family = %request.endpoint.family,
            turns = conversation.len(),
            "composing prompt"
        );

        // Unresolved tool references are the one hard failure originating
        // here; they propagate uncaught.
        for name in &current.tool_references {
            if !request.tools.contains_name(name) {
                return Err(ComposerError::ToolResolution(name.clone()));
            }
        }

        let capabilities = Capabilities::evaluate(request.tools);

        // The freezer check completes before any fresh sub-render starts, so
        // a hit skips the service fan-out entirely.
        let global_context = match freezer::replay_global_context(conversation) {
            Some(parts) => parts,
            None => {
                let snapshot = self.services.snapshot(cancel).await?;
                let parts = sections::build_global_context(&snapshot, &self.config, &capabilities);
                freezer::freeze_global_context(conversation, &parts);
                parts
            }
        };

        let mut rendered_turns = Vec::with_capacity(conversation.len());
        for index in 0..conversation.len() {
            let parts = match freezer::replay_user_message(&conversation.turns[index]) {
                Some(parts) => parts,
                None => {
                    let parts = sections::build_user_message_parts(&conversation.turns[index]);
                    freezer::freeze_user_message(&mut conversation.turns[index], &parts);
                    parts
                }
            };
            rendered_turns.push(parts);
        }

        if cancel.is_cancelled() {
            return Err(ComposerError::Cancelled);
        }

        let fragments = policy::build_fragments(policy::PlanInputs {
            config: &self.config,
            endpoint: request.endpoint,
            capabilities: &capabilities,
            global_context,
            conversation,
            rendered_turns: &rendered_turns,
            summary: request.summary,
            custom_instructions: request.custom_instructions,
        });

        let budget = request.endpoint.max_prompt_tokens;
        let outcome = budget::allocate(&fragments, budget);
        let messages = segmenter::assemble(outcome.blocks, self.config.caching_enabled);

        Ok(RenderOutcome {
            messages,
            budget,
            tokens_used: outcome.tokens_used,
            dropped_fragments: outcome.dropped,
        })
    }
}
