//! Environment and workspace sections.

use crate::config::ComposerConfig;
use crate::context::WorkspaceSnapshot;

/// Build the environment section: OS and, outside simulation mode, the
/// current date.
///
/// The date is omitted entirely under simulation so renders taken on
/// different calendar days stay byte-identical (cache-key stability).
pub fn build_environment_section(config: &ComposerConfig) -> Option<String> {
    let mut content = String::new();
    content.push_str(&format!("- OS: {}\n", std::env::consts::OS));
    if !config.simulation {
        content.push_str(&format!(
            "- Date: {}\n",
            chrono::Local::now().format("%a %b %d %Y")
        ));
    }
    Some(format!("## Environment\n\n{content}"))
}

/// Build the workspace section: folders, active editor, active notebook.
pub fn build_workspace_section(snapshot: &WorkspaceSnapshot) -> Option<String> {
    let mut content = String::new();

    for folder in &snapshot.folders {
        content.push_str(&format!("- Folder: {}\n", folder.display()));
    }

    if let Some(editor) = &snapshot.active_editor {
        content.push_str(&format!("- Active file: {}", editor.path.display()));
        if let Some(language) = &editor.language {
            content.push_str(&format!(" ({language})"));
        }
        if let Some((start, end)) = editor.selection {
            content.push_str(&format!(", selected lines {start}-{end}"));
        }
        content.push('\n');
    }

    if let Some(notebook) = &snapshot.active_notebook {
        content.push_str(&format!(
            "- Active notebook: {} ({} cells",
            notebook.path.display(),
            notebook.cell_count
        ));
        if let Some(cell) = notebook.active_cell {
            content.push_str(&format!(", cell {cell} selected"));
        }
        content.push_str(")\n");
    }

    if content.is_empty() {
        return None;
    }
    Some(format!("## Workspace\n\n{content}"))
}
