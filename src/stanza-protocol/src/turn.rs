//! Conversation turns and their lifecycle artifacts.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::message::ContentPart;

/// A tool invocation recorded on a turn.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            call_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }
}

/// The result text of a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolCallResult {
    pub call_id: String,
    pub output: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn new(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            output: output.into(),
            is_error: false,
        }
    }
}

/// One burst of tool calls and their results within a turn.
///
/// The composer treats these as opaque records: it positions and truncates
/// them but never interprets arguments or output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ToolCallRound {
    pub calls: Vec<ToolCall>,
    pub results: Vec<ToolCallResult>,
}

impl ToolCallRound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a call and its result in one step.
    pub fn with_exchange(mut self, call: ToolCall, output: impl Into<String>) -> Self {
        let result = ToolCallResult::new(call.call_id.clone(), output);
        self.calls.push(call);
        self.results.push(result);
        self
    }

    /// Look up the result for a call id.
    pub fn result_for(&self, call_id: &str) -> Option<&ToolCallResult> {
        self.results.iter().find(|r| r.call_id == call_id)
    }
}

/// Kind of an edited-file event observed since the previous turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileEventKind {
    /// The user kept an assistant edit unchanged. Never rendered.
    Keep,
    /// The user undid an assistant edit.
    Undo,
    /// The user manually modified an edited file.
    UserModification,
}

/// A file-level event attached to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EditedFileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
}

impl EditedFileEvent {
    pub fn new(kind: FileEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Write-once render metadata attached to a turn.
///
/// The field set is closed and known ahead of time, so each snapshot is a
/// named optional field rather than an open-ended keyed store. A field is
/// attached at most once per turn and never revised afterward.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TurnMetadata {
    rendered_user_message: Option<Vec<ContentPart>>,
    rendered_global_context: Option<Vec<ContentPart>>,
}

impl TurnMetadata {
    /// The frozen rendered user message, if attached.
    pub fn rendered_user_message(&self) -> Option<&[ContentPart]> {
        self.rendered_user_message.as_deref()
    }

    /// The frozen global-context snapshot, if attached.
    pub fn rendered_global_context(&self) -> Option<&[ContentPart]> {
        self.rendered_global_context.as_deref()
    }

    /// Attach the rendered user message. Returns false if already attached;
    /// the existing snapshot is kept.
    pub fn attach_rendered_user_message(&mut self, parts: Vec<ContentPart>) -> bool {
        if self.rendered_user_message.is_some() {
            return false;
        }
        self.rendered_user_message = Some(parts);
        true
    }

    /// Attach the global-context snapshot. Returns false if already attached;
    /// the existing snapshot is kept.
    pub fn attach_rendered_global_context(&mut self, parts: Vec<ContentPart>) -> bool {
        if self.rendered_global_context.is_some() {
            return false;
        }
        self.rendered_global_context = Some(parts);
        true
    }
}

/// One user request and its lifecycle artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Turn {
    /// The user's request text.
    pub request: String,
    /// Tool references attached to the request (by stable tool name).
    #[serde(default)]
    pub tool_references: Vec<String>,
    /// Tool-call rounds executed during this turn.
    #[serde(default)]
    pub tool_rounds: Vec<ToolCallRound>,
    /// Edited-file events observed since the previous turn.
    #[serde(default)]
    pub edited_files: Vec<EditedFileEvent>,
    /// Write-once render metadata.
    #[serde(default)]
    pub metadata: TurnMetadata,
}

impl Turn {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            tool_references: Vec::new(),
            tool_rounds: Vec::new(),
            edited_files: Vec::new(),
            metadata: TurnMetadata::default(),
        }
    }

    /// Attach a tool reference.
    pub fn with_tool_reference(mut self, name: impl Into<String>) -> Self {
        self.tool_references.push(name.into());
        self
    }

    /// Attach a tool-call round.
    pub fn with_tool_round(mut self, round: ToolCallRound) -> Self {
        self.tool_rounds.push(round);
        self
    }

    /// Attach an edited-file event.
    pub fn with_edited_file(mut self, event: EditedFileEvent) -> Self {
        self.edited_files.push(event);
        self
    }
}

/// An ordered sequence of turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Conversation {
    pub turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns preceding the current one.
    pub fn history(&self) -> &[Turn] {
        match self.turns.len() {
            0 => &[],
            n => &self.turns[..n - 1],
        }
    }

    /// The current (most recent) turn.
    pub fn current_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Mutable access to the current turn.
    pub fn current_turn_mut(&mut self) -> Option<&mut Turn> {
        self.turns.last_mut()
    }
}
