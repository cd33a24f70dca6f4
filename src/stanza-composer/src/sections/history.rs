//! Conversation history content.

use stanza_protocol::{ContentPart, ToolCall, ToolCallRound};

use crate::prompts::SUMMARY_PREFIX;

/// Render one tool exchange as text.
pub fn tool_exchange_text(call: &ToolCall, output: &str) -> String {
    format!("[tool {}]\n{}", call.name, output)
}

/// Parts for one historical turn: the rendered user message followed by its
/// tool exchanges. Calls without a recorded result are skipped.
pub fn turn_parts(rendered_user: &[ContentPart], rounds: &[ToolCallRound]) -> Vec<ContentPart> {
    let mut parts = rendered_user.to_vec();
    for round in rounds {
        for call in &round.calls {
            if let Some(result) = round.result_for(&call.call_id) {
                parts.push(ContentPart::text(tool_exchange_text(call, &result.output)));
            }
        }
    }
    parts
}

/// Text of the summarized-history fragment.
pub fn summarized_history_text(summary: &str) -> String {
    format!("{SUMMARY_PREFIX}{summary}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_parts_appends_tool_exchanges() {
        let call = ToolCall::new("run-in-terminal", serde_json::json!({"command": "ls"}));
        let round = ToolCallRound::new().with_exchange(call, "main.rs");
        let rendered = vec![ContentPart::text("list the files")];

        let parts = turn_parts(&rendered, &[round]);
        assert_eq!(parts.len(), 2);
        match &parts[1] {
            ContentPart::Text { text } => {
                assert!(text.starts_with("[tool run-in-terminal]"));
                assert!(text.contains("main.rs"));
            }
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn test_calls_without_results_are_skipped() {
        let mut round = ToolCallRound::new();
        round
            .calls
            .push(ToolCall::new("run-task", serde_json::json!({})));

        let parts = turn_parts(&[ContentPart::text("go")], &[round]);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_summary_carries_prefix() {
        let text = summarized_history_text("We renamed the parser module.");
        assert!(text.starts_with(SUMMARY_PREFIX));
        assert!(text.ends_with("module."));
    }
}
