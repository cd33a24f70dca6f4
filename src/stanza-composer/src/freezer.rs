//! Turn freezing: memoization of rendered content on turn metadata.
//!
//! Rendering a turn's user message or the conversation's global context is
//! skipped when the turn already carries the rendered output as metadata.
//! Replay strips inherited breakpoint markers — marker state is never
//! replayed from history; seams are recomputed for the current render only,
//! because inserting a marker retroactively would corrupt the cache's
//! ordering guarantee.

use tracing::debug;

use stanza_protocol::{ContentPart, Conversation, Turn};

use crate::segmenter::strip_breakpoints;

/// Replay a turn's frozen user message, if attached.
pub fn replay_user_message(turn: &Turn) -> Option<Vec<ContentPart>> {
    let frozen = turn.metadata.rendered_user_message()?;
    debug!("replaying frozen user message");
    let mut parts = frozen.to_vec();
    strip_breakpoints(&mut parts);
    Some(parts)
}

/// Attach a freshly rendered user message to a turn. A second attach is a
/// no-op: the first snapshot wins for the turn's lifetime.
pub fn freeze_user_message(turn: &mut Turn, parts: &[ContentPart]) {
    if !turn.metadata.attach_rendered_user_message(parts.to_vec()) {
        debug!("user message already frozen; keeping the first snapshot");
    }
}

/// Replay the conversation's frozen global context, if the first turn
/// carries it.
pub fn replay_global_context(conversation: &Conversation) -> Option<Vec<ContentPart>> {
    let frozen = conversation
        .turns
        .first()?
        .metadata
        .rendered_global_context()?;
    debug!("replaying frozen global context");
    let mut parts = frozen.to_vec();
    strip_breakpoints(&mut parts);
    Some(parts)
}

/// Attach the global-context snapshot to the conversation's first turn.
///
/// Later turns reuse it for the conversation's lifetime: the environment and
/// workspace context is intentionally not updated mid-conversation.
pub fn freeze_global_context(conversation: &mut Conversation, parts: &[ContentPart]) {
    let Some(first) = conversation.turns.first_mut() else {
        return;
    };
    if !first.metadata.attach_rendered_global_context(parts.to_vec()) {
        debug!("global context already frozen; keeping the first snapshot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_strips_markers() {
        let mut turn = Turn::new("request");
        freeze_user_message(
            &mut turn,
            &[
                ContentPart::text("request"),
                ContentPart::CacheBreakpoint,
            ],
        );

        let replayed = replay_user_message(&turn).unwrap();
        assert_eq!(replayed, vec![ContentPart::text("request")]);
    }

    #[test]
    fn test_freeze_is_write_once() {
        let mut turn = Turn::new("request");
        freeze_user_message(&mut turn, &[ContentPart::text("first")]);
        freeze_user_message(&mut turn, &[ContentPart::text("second")]);

        let replayed = replay_user_message(&turn).unwrap();
        assert_eq!(replayed, vec![ContentPart::text("first")]);
    }

    #[test]
    fn test_global_context_lives_on_first_turn() {
        let mut conversation = Conversation::new();
        conversation.push_turn(Turn::new("one"));
        conversation.push_turn(Turn::new("two"));

        assert!(replay_global_context(&conversation).is_none());
        freeze_global_context(&mut conversation, &[ContentPart::text("env")]);

        assert_eq!(
            replay_global_context(&conversation).unwrap(),
            vec![ContentPart::text("env")]
        );
        assert!(
            conversation.turns[1]
                .metadata
                .rendered_global_context()
                .is_none()
        );
    }

    #[test]
    fn test_missing_metadata_replays_nothing() {
        let turn = Turn::new("request");
        assert!(replay_user_message(&turn).is_none());
        assert!(replay_global_context(&Conversation::new()).is_none());
    }
}
