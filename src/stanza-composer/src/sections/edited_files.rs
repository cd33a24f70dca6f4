//! Edited-file event summary section.

use stanza_protocol::{EditedFileEvent, FileEventKind};

/// Summarize undo and manual-modification events, one line per event.
///
/// "Keep" events are filtered out and never surface; with nothing left the
/// section is absent.
pub fn build_edited_files_summary(events: &[EditedFileEvent]) -> Option<String> {
    let mut lines = Vec::new();

    for event in events {
        match event.kind {
            FileEventKind::Keep => continue,
            FileEventKind::Undo => lines.push(format!(
                "- The user undid the edit to {}",
                event.path.display()
            )),
            FileEventKind::UserModification => lines.push(format!(
                "- The user manually modified {}",
                event.path.display()
            )),
        }
    }

    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "## File changes since the last message\n\n{}\n",
        lines.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_events_never_surface() {
        let events = vec![
            EditedFileEvent::new(FileEventKind::Keep, "src/kept.rs"),
            EditedFileEvent::new(FileEventKind::Keep, "src/also_kept.rs"),
        ];
        assert!(build_edited_files_summary(&events).is_none());
    }

    #[test]
    fn test_undo_and_modification_render_one_line_each() {
        let events = vec![
            EditedFileEvent::new(FileEventKind::Undo, "src/a.rs"),
            EditedFileEvent::new(FileEventKind::Keep, "src/b.rs"),
            EditedFileEvent::new(FileEventKind::UserModification, "src/c.rs"),
        ];

        let summary = build_edited_files_summary(&events).unwrap();
        assert!(summary.contains("undid the edit to src/a.rs"));
        assert!(summary.contains("manually modified src/c.rs"));
        assert!(!summary.contains("src/b.rs"));
        assert_eq!(summary.lines().filter(|l| l.starts_with("- ")).count(), 2);
    }
}
