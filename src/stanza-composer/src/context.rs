//! Point-in-time workspace state gathered from the host services.
//!
//! These are query results, not live handles: the composer snapshots them
//! once per conversation (see the turn freezer) and never mutates host
//! state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The active editor and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorContext {
    pub path: PathBuf,
    pub language: Option<String>,
    /// Selected line range, 1-based inclusive.
    pub selection: Option<(u32, u32)>,
}

impl EditorContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            language: None,
            selection: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_selection(mut self, start: u32, end: u32) -> Self {
        self.selection = Some((start, end));
        self
    }
}

/// The active notebook and cell selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookContext {
    pub path: PathBuf,
    pub cell_count: usize,
    pub active_cell: Option<usize>,
}

/// An open pull request on the active repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
}

/// The active repository, resolved to a recognized hosting provider.
///
/// The git service returns `None` when the workspace has no repository or
/// the remote is not a recognized provider; the composer then omits the
/// repo fragment entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoContext {
    pub owner: String,
    pub name: String,
    pub branch: Option<String>,
    pub default_branch: String,
    pub pull_request: Option<PullRequest>,
}

impl RepoContext {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: None,
            default_branch: "main".to_string(),
            pull_request: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn with_pull_request(mut self, number: u64, title: impl Into<String>) -> Self {
        self.pull_request = Some(PullRequest {
            number,
            title: title.into(),
        });
        self
    }
}

/// A task configured in the workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceTask {
    pub label: String,
    /// Task type, e.g. "shell" or "npm". Untyped tasks are not runnable.
    pub kind: Option<String>,
    /// The raw task definition as configured.
    pub definition: serde_json::Value,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub running: bool,
}

impl WorkspaceTask {
    pub fn new(
        label: impl Into<String>,
        kind: impl Into<String>,
        definition: serde_json::Value,
    ) -> Self {
        Self {
            label: label.into(),
            kind: Some(kind.into()),
            definition,
            hidden: false,
            running: false,
        }
    }

    /// A task with no type; never runnable.
    pub fn untyped(label: impl Into<String>, definition: serde_json::Value) -> Self {
        Self {
            label: label.into(),
            kind: None,
            definition,
            hidden: false,
            running: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn running(mut self) -> Self {
        self.running = true;
        self
    }

    /// Whether this task may surface in the tasks fragment.
    pub fn is_runnable(&self) -> bool {
        !self.hidden && self.kind.is_some()
    }
}

/// Everything the composer learns from the host in one fan-out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub folders: Vec<PathBuf>,
    pub active_editor: Option<EditorContext>,
    pub active_notebook: Option<NotebookContext>,
    pub repository: Option<RepoContext>,
    pub tasks: Vec<WorkspaceTask>,
}

impl WorkspaceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runnable, non-hidden tasks.
    pub fn runnable_tasks(&self) -> impl Iterator<Item = &WorkspaceTask> {
        self.tasks.iter().filter(|t| t.is_runnable())
    }

    /// Tasks currently running.
    pub fn running_tasks(&self) -> impl Iterator<Item = &WorkspaceTask> {
        self.tasks.iter().filter(|t| t.running)
    }
}
