//! Reminder text selection.

use stanza_protocol::ModelEndpoint;

use crate::policy::Capabilities;
use crate::prompts::{
    COPY_COMMANDS_REMINDER, EDIT_PREFERENCE_SOFT, EDIT_PREFERENCE_STRONG,
    NOTEBOOK_FORMAT_GUIDANCE, TERMINAL_REMINDER,
};

/// Pick the reminder texts for this render, in output order.
pub fn reminder_texts(capabilities: &Capabilities, endpoint: &ModelEndpoint) -> Vec<&'static str> {
    let mut texts = Vec::new();

    if capabilities.can_edit_files {
        texts.push(NOTEBOOK_FORMAT_GUIDANCE);
    }

    if capabilities.has_terminal {
        texts.push(TERMINAL_REMINDER);
    } else {
        texts.push(COPY_COMMANDS_REMINDER);
    }

    if capabilities.has_edit_file_and_replace {
        texts.push(if endpoint.needs_strong_replace_hint {
            EDIT_PREFERENCE_STRONG
        } else {
            EDIT_PREFERENCE_SOFT
        });
    }

    texts
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_protocol::{AvailableTools, ToolName};

    fn endpoint() -> ModelEndpoint {
        ModelEndpoint::new("gpt-5-codex", "gpt", 128_000)
    }

    #[test]
    fn test_no_terminal_gets_copy_reminder() {
        let capabilities = Capabilities::evaluate(&AvailableTools::new());
        let texts = reminder_texts(&capabilities, &endpoint());

        assert_eq!(texts, vec![COPY_COMMANDS_REMINDER]);
    }

    #[test]
    fn test_editing_tools_add_notebook_guidance() {
        let tools = AvailableTools::from_tools(&[ToolName::ApplyPatch, ToolName::RunInTerminal]);
        let capabilities = Capabilities::evaluate(&tools);
        let texts = reminder_texts(&capabilities, &endpoint());

        assert_eq!(texts, vec![NOTEBOOK_FORMAT_GUIDANCE, TERMINAL_REMINDER]);
    }

    #[test]
    fn test_replace_hint_strength_follows_endpoint() {
        let tools = AvailableTools::from_tools(&[ToolName::EditFile, ToolName::ReplaceString]);
        let capabilities = Capabilities::evaluate(&tools);

        let soft = reminder_texts(&capabilities, &endpoint());
        assert!(soft.contains(&EDIT_PREFERENCE_SOFT));

        let strong = reminder_texts(&capabilities, &endpoint().with_strong_replace_hint());
        assert!(strong.contains(&EDIT_PREFERENCE_STRONG));
        assert!(!strong.contains(&EDIT_PREFERENCE_SOFT));
    }
}
