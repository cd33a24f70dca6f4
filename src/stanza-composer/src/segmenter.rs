//! Message assembly and cache segmentation.
//!
//! Rendered blocks are merged into role-tagged messages; when caching is
//! enabled, breakpoint markers are inserted at two designated seams: the end
//! of the static global-context block and the end of the current user
//! message. Content before a marker is stable and cacheable.

use stanza_protocol::{ContentPart, Message};

use crate::budget::RenderedBlock;
use crate::fragment::BlockKind;

/// Remove inherited breakpoint markers from replayed content.
///
/// Frozen content is reused all-or-nothing: its original marker state is
/// reset here and the seam positions are recomputed for the current render.
pub fn strip_breakpoints(parts: &mut Vec<ContentPart>) {
    parts.retain(|part| !part.is_breakpoint());
}

/// Insert a breakpoint at `index` within `parts`, honoring atomic spans.
///
/// A seam that falls strictly inside an atomic span is lifted out to
/// directly follow the span. If a marker is already present at the final
/// position, nothing is inserted. Returns the index of the marker.
pub fn place_breakpoint(
    parts: &mut Vec<ContentPart>,
    index: usize,
    atomic_spans: &[(usize, usize)],
) -> usize {
    let mut index = index.min(parts.len());
    for &(start, end) in atomic_spans {
        if index > start && index < end {
            index = end;
        }
    }
    let index = index.min(parts.len());

    let already_present = (index > 0 && parts[index - 1].is_breakpoint())
        || parts.get(index).is_some_and(ContentPart::is_breakpoint);
    if !already_present {
        parts.insert(index, ContentPart::CacheBreakpoint);
    }
    index
}

/// Merge rendered blocks into messages and segment them for caching.
///
/// Consecutive blocks with the same role merge into one message. At most
/// one breakpoint is emitted per designated seam per render.
pub fn assemble(blocks: Vec<RenderedBlock>, caching_enabled: bool) -> Vec<Message> {
    struct PendingMessage {
        message: Message,
        atomic_spans: Vec<(usize, usize)>,
        global_seam: Option<usize>,
        user_seam: Option<usize>,
    }

    let mut pending: Vec<PendingMessage> = Vec::new();

    for block in blocks {
        let needs_new = pending
            .last()
            .is_none_or(|p| p.message.role != block.role);
        if needs_new {
            pending.push(PendingMessage {
                message: Message::new(block.role),
                atomic_spans: Vec::new(),
                global_seam: None,
                user_seam: None,
            });
        }

        let current = pending.last_mut().expect("message pushed above");
        let start = current.message.parts.len();
        current.message.parts.extend(block.parts);
        let end = current.message.parts.len();

        if block.atomic {
            current.atomic_spans.push((start, end));
        }
        match block.kind {
            // The seam follows the last block of its kind in the message.
            BlockKind::GlobalContext => current.global_seam = Some(end),
            BlockKind::UserMessage => current.user_seam = Some(end),
            _ => {}
        }
    }

    let mut messages = Vec::with_capacity(pending.len());
    for mut entry in pending {
        if caching_enabled {
            // Seam order matters: inserting the earlier seam first keeps the
            // later seam's recorded index valid only if adjusted, so insert
            // back-to-front.
            let mut seams: Vec<usize> = Vec::new();
            if let Some(seam) = entry.global_seam {
                seams.push(seam);
            }
            if let Some(seam) = entry.user_seam {
                seams.push(seam);
            }
            seams.sort_unstable();
            for seam in seams.into_iter().rev() {
                place_breakpoint(&mut entry.message.parts, seam, &entry.atomic_spans);
            }
        }
        messages.push(entry.message);
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_protocol::Role;

    fn block(kind: BlockKind, role: Role, text: &str) -> RenderedBlock {
        RenderedBlock {
            kind,
            role,
            parts: vec![ContentPart::text(text)],
            atomic: false,
            tokens: 1,
        }
    }

    #[test]
    fn test_strip_breakpoints() {
        let mut parts = vec![
            ContentPart::text("a"),
            ContentPart::CacheBreakpoint,
            ContentPart::text("b"),
        ];
        strip_breakpoints(&mut parts);
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| !p.is_breakpoint()));
    }

    #[test]
    fn test_place_breakpoint_lifts_out_of_atomic_span() {
        let mut parts = vec![
            ContentPart::text("a"),
            ContentPart::text("b"),
            ContentPart::text("c"),
        ];
        // Seam at 1 is inside the atomic span (0, 2): lifted to 2.
        let placed = place_breakpoint(&mut parts, 1, &[(0, 2)]);
        assert_eq!(placed, 2);
        assert!(parts[2].is_breakpoint());
    }

    #[test]
    fn test_place_breakpoint_never_duplicates() {
        let mut parts = vec![ContentPart::text("a"), ContentPart::CacheBreakpoint];
        place_breakpoint(&mut parts, 2, &[]);
        assert_eq!(
            parts.iter().filter(|p| p.is_breakpoint()).count(),
            1,
            "marker already at the seam is reused"
        );
    }

    #[test]
    fn test_assemble_merges_roles_and_segments() {
        let blocks = vec![
            block(BlockKind::Instructions, Role::System, "instructions"),
            block(BlockKind::GlobalContext, Role::System, "context"),
            block(BlockKind::History, Role::User, "history"),
            block(BlockKind::UserMessage, Role::User, "request"),
            block(BlockKind::ToolResult, Role::User, "output"),
        ];

        let messages = assemble(blocks, true);
        assert_eq!(messages.len(), 2);

        // System message: breakpoint directly after global context.
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].parts.last().unwrap().is_breakpoint());

        // User message: breakpoint after the request, before tool output.
        assert_eq!(messages[1].role, Role::User);
        let marker_at = messages[1]
            .parts
            .iter()
            .position(ContentPart::is_breakpoint)
            .unwrap();
        assert_eq!(marker_at, 2);
        assert_eq!(messages[1].breakpoint_count(), 1);
    }

    #[test]
    fn test_assemble_without_caching_emits_no_markers() {
        let blocks = vec![
            block(BlockKind::GlobalContext, Role::System, "context"),
            block(BlockKind::UserMessage, Role::User, "request"),
        ];

        let messages = assemble(blocks, false);
        assert!(messages.iter().all(|m| m.breakpoint_count() == 0));
    }
}
