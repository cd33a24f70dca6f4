//! Role-tagged messages and their content parts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Role of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions and global context.
    System,
    /// User request, history, and tool output visible to the model.
    User,
}

/// A single piece of message content.
///
/// `CacheBreakpoint` is a zero-width marker: content before it is stable and
/// may be reused by a downstream prompt cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text content.
    Text { text: String },

    /// Image reference.
    Image { url: String },

    /// Cache segmentation marker. Carries no renderable content.
    CacheBreakpoint,
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part.
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    /// Whether this part is a cache breakpoint marker.
    pub fn is_breakpoint(&self) -> bool {
        matches!(self, Self::CacheBreakpoint)
    }
}

/// An ordered sequence of content parts under one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl Message {
    /// Create an empty message with the given role.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            parts: Vec::new(),
        }
    }

    /// Create a system message from parts.
    pub fn system(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::System,
            parts,
        }
    }

    /// Create a user message from parts.
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Append a part.
    pub fn push(&mut self, part: ContentPart) {
        self.parts.push(part);
    }

    /// Concatenated text of all text parts.
    pub fn visible_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Number of breakpoint markers in this message.
    pub fn breakpoint_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_breakpoint()).count()
    }
}
