//! Shared protocol types for the Stanza prompt composer.
//!
//! This crate defines the data model exchanged between the composer and its
//! host application:
//!
//! - **Messages**: role-tagged sequences of content parts ready for
//!   submission to a model endpoint (see [`message`])
//! - **Conversation**: ordered turns with their tool-call rounds,
//!   edited-file events, and write-once render metadata (see [`turn`])
//! - **Tools**: stable tool names and the available-tool set used for
//!   capability checks (see [`tools`])
//! - **Endpoint**: the model descriptor carrying the prompt token budget
//!   and reminder-wording flags (see [`endpoint`])

pub mod endpoint;
pub mod message;
pub mod tools;
pub mod turn;

pub use endpoint::ModelEndpoint;
pub use message::{ContentPart, Message, Role};
pub use tools::{AvailableTools, ToolName};
pub use turn::{
    Conversation, EditedFileEvent, FileEventKind, ToolCall, ToolCallResult, ToolCallRound, Turn,
    TurnMetadata,
};
