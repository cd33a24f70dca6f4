//! Content builders for the individual prompt sections.
//!
//! Builders produce text for one concern each and return `None` whenever no
//! qualifying data exists — absence is a valid, silent outcome throughout
//! this layer; no section ever renders an empty placeholder.

pub mod edited_files;
pub mod environment;
pub mod history;
pub mod reminders;
pub mod repo;
pub mod tasks;

use stanza_protocol::{ContentPart, Turn};

use crate::config::ComposerConfig;
use crate::context::WorkspaceSnapshot;
use crate::policy::Capabilities;

/// Build the global-context parts from a fresh workspace snapshot.
///
/// One text part per present section; the result is frozen on the
/// conversation's first turn and replayed for its lifetime.
pub fn build_global_context(
    snapshot: &WorkspaceSnapshot,
    config: &ComposerConfig,
    capabilities: &Capabilities,
) -> Vec<ContentPart> {
    let mut sections: Vec<String> = Vec::new();

    sections.extend(environment::build_environment_section(config));
    sections.extend(environment::build_workspace_section(snapshot));
    sections.extend(repo::build_repo_section(snapshot.repository.as_ref()));
    if capabilities.has_terminal {
        sections.extend(tasks::build_terminal_state_section(&snapshot.tasks));
    }
    if config.tasks_enabled {
        sections.extend(tasks::build_tasks_section(&snapshot.tasks));
    }

    sections.into_iter().map(ContentPart::text).collect()
}

/// Build the rendered user-message parts for a turn.
pub fn build_user_message_parts(turn: &Turn) -> Vec<ContentPart> {
    let mut text = turn.request.clone();
    if !turn.tool_references.is_empty() {
        text.push_str("\n\nReferenced tools: ");
        text.push_str(&turn.tool_references.join(", "));
    }
    vec![ContentPart::text(text)]
}
