//! Host service traits and the snapshot fan-out.
//!
//! The composer never mutates host state: every trait method is a
//! point-in-time query. Absence (`None`, empty vec) is a normal outcome and
//! silently omits the corresponding fragment; an `Err` is a hard collaborator
//! failure and propagates to the caller.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::{EditorContext, NotebookContext, RepoContext, WorkspaceSnapshot, WorkspaceTask};
use crate::{ComposerError, Result};

/// A hard failure from a host service.
#[derive(Error, Debug, Clone)]
#[error("{service} service failed: {message}")]
pub struct ServiceError {
    pub service: &'static str,
    pub message: String,
}

impl ServiceError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// Result type for service queries.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Workspace and editor introspection.
#[async_trait]
pub trait WorkspaceService: Send + Sync {
    /// Workspace folder roots.
    async fn folders(&self) -> ServiceResult<Vec<PathBuf>>;

    /// The active editor and selection, if any.
    async fn active_editor(&self) -> ServiceResult<Option<EditorContext>>;

    /// The active notebook and cell selection, if any.
    async fn active_notebook(&self) -> ServiceResult<Option<NotebookContext>>;
}

/// Git repository metadata lookup.
#[async_trait]
pub trait GitService: Send + Sync {
    /// The active repository resolved to a recognized hosting provider,
    /// or `None` when there is no such repository.
    async fn active_repository(&self) -> ServiceResult<Option<RepoContext>>;
}

/// Workspace task enumeration.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// All configured tasks with their running state.
    async fn tasks(&self) -> ServiceResult<Vec<WorkspaceTask>>;
}

/// The bundle of host services the composer queries.
#[derive(Clone)]
pub struct Services {
    pub workspace: Arc<dyn WorkspaceService>,
    pub git: Arc<dyn GitService>,
    pub tasks: Arc<dyn TaskService>,
}

impl Services {
    pub fn new(
        workspace: Arc<dyn WorkspaceService>,
        git: Arc<dyn GitService>,
        tasks: Arc<dyn TaskService>,
    ) -> Self {
        Self {
            workspace,
            git,
            tasks,
        }
    }

    /// Fan out all service queries concurrently and join the results.
    ///
    /// Sibling queries share no mutable state; the only ordering constraint
    /// is that all must complete before budget allocation starts.
    pub(crate) async fn snapshot(&self, cancel: &CancellationToken) -> Result<WorkspaceSnapshot> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ComposerError::Cancelled),
            gathered = self.gather() => Ok(gathered?),
        }
    }

    async fn gather(&self) -> ServiceResult<WorkspaceSnapshot> {
        let ((folders, active_editor, active_notebook), repository, tasks) = future::try_join3(
            future::try_join3(
                self.workspace.folders(),
                self.workspace.active_editor(),
                self.workspace.active_notebook(),
            ),
            self.git.active_repository(),
            self.tasks.tasks(),
        )
        .await?;

        Ok(WorkspaceSnapshot {
            folders,
            active_editor,
            active_notebook,
            repository,
            tasks,
        })
    }
}
