//! Background task execution — runs pipeline work outside the request path.
//!
//! The executor is the failure boundary for proposal runs: a task's error is
//! captured, logged with context, and recorded in the in-process status
//! registry. Nothing propagates to the caller, who already received an
//! acceptance. There is no retry and no cancellation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::PipelineError;

/// Lifecycle state of a submitted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    Failed { error: String },
}

/// Status record for a submitted task.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub label: String,
    pub state: TaskState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Spawns and tracks background pipeline runs.
#[derive(Default)]
pub struct BackgroundExecutor {
    tasks: Arc<RwLock<HashMap<Uuid, TaskRecord>>>,
    handles: Arc<RwLock<HashMap<Uuid, JoinHandle<()>>>>,
}

impl BackgroundExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a task. Returns immediately with the task id; the future runs
    /// on the tokio runtime and its outcome is recorded, not returned.
    pub async fn submit<F>(&self, label: impl Into<String>, task: F) -> Uuid
    where
        F: Future<Output = Result<(), PipelineError>> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let label = label.into();
        self.tasks.write().await.insert(
            id,
            TaskRecord {
                label: label.clone(),
                state: TaskState::Running,
                started_at: Utc::now(),
                finished_at: None,
            },
        );

        let tasks = Arc::clone(&self.tasks);
        let handle = tokio::spawn(async move {
            let state = match task.await {
                Ok(()) => {
                    tracing::info!(task = %id, label = %label, "Background task completed");
                    TaskState::Completed
                }
                Err(e) => {
                    tracing::error!(task = %id, label = %label, error = %e, "Background task failed");
                    TaskState::Failed {
                        error: e.to_string(),
                    }
                }
            };
            let mut tasks = tasks.write().await;
            if let Some(record) = tasks.get_mut(&id) {
                record.state = state;
                record.finished_at = Some(Utc::now());
            }
        });
        self.handles.write().await.insert(id, handle);
        id
    }

    /// Current status of a task, if known.
    pub async fn status(&self, id: Uuid) -> Option<TaskRecord> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// Number of tasks still running.
    pub async fn running(&self) -> usize {
        self.tasks
            .read()
            .await
            .values()
            .filter(|r| r.state == TaskState::Running)
            .count()
    }

    /// Wait for a specific task to finish. Used by tests and shutdown.
    pub async fn wait(&self, id: Uuid) {
        let handle = self.handles.write().await.remove(&id);
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_task_is_recorded_as_completed() {
        let executor = BackgroundExecutor::new();
        let id = executor.submit("proposal", async { Ok(()) }).await;
        executor.wait(id).await;

        let record = executor.status(id).await.unwrap();
        assert_eq!(record.state, TaskState::Completed);
        assert_eq!(record.label, "proposal");
        assert!(record.finished_at.is_some());
    }

    #[tokio::test]
    async fn failed_task_captures_the_error() {
        let executor = BackgroundExecutor::new();
        let id = executor
            .submit("proposal", async {
                Err(PipelineError::MissingField("email"))
            })
            .await;
        executor.wait(id).await;

        match executor.status(id).await.unwrap().state {
            TaskState::Failed { error } => assert!(error.contains("email")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_task_has_no_status() {
        let executor = BackgroundExecutor::new();
        assert!(executor.status(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn running_counts_in_flight_tasks() {
        let executor = BackgroundExecutor::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let id = executor
            .submit("slow", async move {
                let _ = rx.await;
                Ok(())
            })
            .await;
        assert_eq!(executor.running().await, 1);
        tx.send(()).unwrap();
        executor.wait(id).await;
        assert_eq!(executor.running().await, 0);
    }
}
