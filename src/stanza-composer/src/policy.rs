//! Per-turn composition policy: which fragments exist, in what order, with
//! what budget attributes.
//!
//! Capability predicates are evaluated once per render against the immutable
//! available-tool set; the resulting booleans gate fragment construction.
//! Declaration order in the builder is the final message order and the
//! tie-break order for budget decisions.

use indexmap::IndexMap;

use stanza_protocol::{AvailableTools, ContentPart, Conversation, ModelEndpoint, Role, ToolName};

use crate::config::ComposerConfig;
use crate::fragment::{BlockKind, Fragment};
use crate::prompts::BASE_INSTRUCTIONS;
use crate::sections::{edited_files, history, reminders};

pub(crate) const PRIORITY_INSTRUCTIONS: i32 = 100;
pub(crate) const PRIORITY_USER_MESSAGE: i32 = 90;
pub(crate) const PRIORITY_TOOL_RESULTS: i32 = 80;
pub(crate) const PRIORITY_GLOBAL_CONTEXT: i32 = 70;
pub(crate) const PRIORITY_REMINDERS: i32 = 60;
pub(crate) const PRIORITY_EDITED_FILES: i32 = 50;
pub(crate) const PRIORITY_HISTORY: i32 = 40;

/// Capability predicates over the available-tool set, evaluated once per
/// render.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    /// Any file-editing tool is available.
    pub can_edit_files: bool,
    /// The terminal tool is available.
    pub has_terminal: bool,
    /// Both edit-file and replace-string are available.
    pub has_edit_file_and_replace: bool,
}

impl Capabilities {
    pub fn evaluate(tools: &AvailableTools) -> Self {
        Self {
            can_edit_files: tools.has_editing_tool(),
            has_terminal: tools.contains(ToolName::RunInTerminal),
            has_edit_file_and_replace: tools.contains(ToolName::EditFile)
                && tools.contains(ToolName::ReplaceString),
        }
    }
}

/// Declaration-ordered fragment registry.
///
/// Insertion order is semantic: it is both the output order and the stable
/// tie-break for budget decisions.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    fragments: IndexMap<String, Fragment>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>, fragment: Fragment) {
        self.fragments.insert(label.into(), fragment);
    }

    pub fn add_optional(&mut self, label: impl Into<String>, fragment: Option<Fragment>) {
        if let Some(fragment) = fragment {
            self.add(label, fragment);
        }
    }

    pub fn has(&self, label: &str) -> bool {
        self.fragments.contains_key(label)
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments.into_values().collect()
    }
}

/// Inputs to one fragment-tree build.
pub(crate) struct PlanInputs<'a> {
    pub config: &'a ComposerConfig,
    pub endpoint: &'a ModelEndpoint,
    pub capabilities: &'a Capabilities,
    /// Replayed or freshly built global-context parts.
    pub global_context: Vec<ContentPart>,
    pub conversation: &'a Conversation,
    /// Rendered user-message parts, one entry per turn.
    pub rendered_turns: &'a [Vec<ContentPart>],
    pub summary: Option<&'a str>,
    pub custom_instructions: Option<&'a str>,
}

/// Build the fragment list for one render.
pub(crate) fn build_fragments(inputs: PlanInputs<'_>) -> Vec<Fragment> {
    let budget = inputs.endpoint.max_prompt_tokens;
    let mut tree = TreeBuilder::new();

    let mut instructions = BASE_INSTRUCTIONS.to_string();
    if let Some(custom) = inputs.custom_instructions {
        instructions.push_str("\n\n");
        instructions.push_str(custom);
    }
    tree.add(
        "instructions",
        Fragment::text(
            BlockKind::Instructions,
            Role::System,
            PRIORITY_INSTRUCTIONS,
            instructions,
        ),
    );

    if !inputs.global_context.is_empty() {
        tree.add(
            "global-context",
            Fragment::parts(
                BlockKind::GlobalContext,
                Role::System,
                PRIORITY_GLOBAL_CONTEXT,
                inputs.global_context,
            ),
        );
    }

    let summarized = inputs.config.summarization_enabled && inputs.summary.is_some();
    if let Some(summary) = inputs.summary.filter(|_| inputs.config.summarization_enabled) {
        tree.add(
            "summarized-history",
            Fragment::text(
                BlockKind::History,
                Role::User,
                PRIORITY_USER_MESSAGE,
                history::summarized_history_text(summary),
            ),
        );
    } else {
        let history_children: Vec<Fragment> = inputs
            .conversation
            .history()
            .iter()
            .zip(inputs.rendered_turns)
            .enumerate()
            .map(|(index, (turn, rendered))| {
                // Older turns drop first under pressure.
                Fragment::parts(
                    BlockKind::History,
                    Role::User,
                    index as i32,
                    history::turn_parts(rendered, &turn.tool_rounds),
                )
            })
            .collect();
        if !history_children.is_empty() {
            tree.add(
                "history",
                Fragment::group(
                    BlockKind::History,
                    Role::User,
                    PRIORITY_HISTORY,
                    history_children,
                )
                .with_grow(1.0),
            );
        }
    }

    if let Some(current) = inputs.conversation.current_turn() {
        tree.add_optional(
            "edited-files",
            edited_files::build_edited_files_summary(&current.edited_files).map(|text| {
                Fragment::text(
                    BlockKind::EditedFiles,
                    Role::User,
                    PRIORITY_EDITED_FILES,
                    text,
                )
            }),
        );

        if !summarized {
            if let Some(rendered) = inputs.rendered_turns.last() {
                tree.add(
                    "user-message",
                    Fragment::parts(
                        BlockKind::UserMessage,
                        Role::User,
                        PRIORITY_USER_MESSAGE,
                        rendered.clone(),
                    ),
                );
            }

            let cap = inputs.config.tool_result_cap(budget);
            for (round_index, round) in current.tool_rounds.iter().enumerate() {
                for (call_index, call) in round.calls.iter().enumerate() {
                    let Some(result) = round.result_for(&call.call_id) else {
                        continue;
                    };
                    tree.add(
                        format!("tool-result-{round_index}-{call_index}"),
                        Fragment::text(
                            BlockKind::ToolResult,
                            Role::User,
                            PRIORITY_TOOL_RESULTS,
                            history::tool_exchange_text(call, &result.output),
                        )
                        .with_size_limit(cap)
                        .atomic(),
                    );
                }
            }
        }
    }

    for (index, text) in reminders::reminder_texts(inputs.capabilities, inputs.endpoint)
        .into_iter()
        .enumerate()
    {
        tree.add(
            format!("reminder-{index}"),
            Fragment::text(BlockKind::Reminder, Role::User, PRIORITY_REMINDERS, text),
        );
    }

    tree.into_fragments()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_protocol::{ToolCall, ToolCallRound, Turn};

    fn plan(
        config: &ComposerConfig,
        endpoint: &ModelEndpoint,
        conversation: &Conversation,
        rendered: &[Vec<ContentPart>],
        summary: Option<&str>,
    ) -> Vec<Fragment> {
        let capabilities = Capabilities::default();
        build_fragments(PlanInputs {
            config,
            endpoint,
            capabilities: &capabilities,
            global_context: vec![ContentPart::text("## Environment\n\n- OS: linux\n")],
            conversation,
            rendered_turns: rendered,
            summary,
            custom_instructions: None,
        })
    }

    fn single_turn() -> (Conversation, Vec<Vec<ContentPart>>) {
        let mut conversation = Conversation::new();
        conversation.push_turn(Turn::new("do the thing"));
        let rendered = vec![vec![ContentPart::text("do the thing")]];
        (conversation, rendered)
    }

    #[test]
    fn test_declaration_order_is_message_order() {
        let config = ComposerConfig::default();
        let endpoint = ModelEndpoint::new("gpt-5-codex", "gpt", 100_000);
        let (conversation, rendered) = single_turn();

        let fragments = plan(&config, &endpoint, &conversation, &rendered, None);
        let kinds: Vec<BlockKind> = fragments.iter().map(|f| f.kind).collect();

        assert_eq!(
            kinds,
            vec![
                BlockKind::Instructions,
                BlockKind::GlobalContext,
                BlockKind::UserMessage,
                BlockKind::Reminder,
            ]
        );
    }

    #[test]
    fn test_summary_replaces_history_and_tool_calls() {
        let config = ComposerConfig {
            summarization_enabled: true,
            ..Default::default()
        };
        let endpoint = ModelEndpoint::new("gpt-5-codex", "gpt", 100_000);

        let mut conversation = Conversation::new();
        conversation.push_turn(Turn::new("first"));
        let call = ToolCall::new("run-in-terminal", serde_json::json!({}));
        conversation.push_turn(
            Turn::new("second").with_tool_round(ToolCallRound::new().with_exchange(call, "ok")),
        );
        let rendered = vec![
            vec![ContentPart::text("first")],
            vec![ContentPart::text("second")],
        ];

        let fragments = plan(
            &config,
            &endpoint,
            &conversation,
            &rendered,
            Some("summary of it all"),
        );
        let kinds: Vec<BlockKind> = fragments.iter().map(|f| f.kind).collect();

        assert!(kinds.contains(&BlockKind::History));
        assert!(!kinds.contains(&BlockKind::UserMessage));
        assert!(!kinds.contains(&BlockKind::ToolResult));
    }

    #[test]
    fn test_summary_ignored_when_summarization_disabled() {
        let config = ComposerConfig::default();
        let endpoint = ModelEndpoint::new("gpt-5-codex", "gpt", 100_000);
        let (conversation, rendered) = single_turn();

        let fragments = plan(
            &config,
            &endpoint,
            &conversation,
            &rendered,
            Some("stale summary"),
        );
        let kinds: Vec<BlockKind> = fragments.iter().map(|f| f.kind).collect();

        assert!(kinds.contains(&BlockKind::UserMessage));
        assert!(!kinds.contains(&BlockKind::History));
    }

    #[test]
    fn test_tool_results_are_capped_and_atomic() {
        let config = ComposerConfig::default();
        let endpoint = ModelEndpoint::new("gpt-5-codex", "gpt", 1000);

        let mut conversation = Conversation::new();
        let call = ToolCall::new("run-in-terminal", serde_json::json!({}));
        conversation.push_turn(
            Turn::new("run it")
                .with_tool_round(ToolCallRound::new().with_exchange(call, "x".repeat(100_000))),
        );
        let rendered = vec![vec![ContentPart::text("run it")]];

        let fragments = plan(&config, &endpoint, &conversation, &rendered, None);
        let tool = fragments
            .iter()
            .find(|f| f.kind == BlockKind::ToolResult)
            .unwrap();

        assert!(tool.atomic);
        assert_eq!(tool.size_limit, Some(500));
    }

    #[test]
    fn test_capabilities_evaluation() {
        let tools = AvailableTools::from_tools(&[
            ToolName::EditFile,
            ToolName::ReplaceString,
            ToolName::RunInTerminal,
        ]);
        let capabilities = Capabilities::evaluate(&tools);

        assert!(capabilities.can_edit_files);
        assert!(capabilities.has_terminal);
        assert!(capabilities.has_edit_file_and_replace);

        let none = Capabilities::evaluate(&AvailableTools::new());
        assert!(!none.can_edit_files);
        assert!(!none.has_terminal);
        assert!(!none.has_edit_file_and_replace);
    }

    #[test]
    fn test_tree_builder_keeps_declaration_order() {
        let mut tree = TreeBuilder::new();
        tree.add("b", Fragment::text(BlockKind::Reminder, Role::User, 1, "b"));
        tree.add("a", Fragment::text(BlockKind::Reminder, Role::User, 2, "a"));
        tree.add_optional("c", None);

        assert!(tree.has("a"));
        assert!(!tree.has("c"));

        let priorities: Vec<i32> = tree.into_fragments().iter().map(|f| f.priority).collect();
        assert_eq!(priorities, vec![1, 2]);
    }
}
