use serde::{Deserialize, Serialize};
use ky_core::Stage;

/// Local status of the active stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    TimedOut,
}

impl StageStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

/// Transient per-run state, owned by the orchestrator for the duration of
/// one `run`. The remote task id is replaced outright when the stage
/// changes, and the attempt counter restarts with it.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub prompt: String,
    pub stage: Stage,
    pub remote_task_id: Option<String>,
    pub status: StageStatus,
    pub attempt: u32,
    pub percent: f32,
}

impl GenerationJob {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            stage: Stage::Preview,
            remote_task_id: None,
            status: StageStatus::Pending,
            attempt: 0,
            percent: 0.0,
        }
    }

    /// Move to a freshly submitted stage.
    pub fn enter_stage(&mut self, stage: Stage, remote_task_id: String) {
        self.stage = stage;
        self.remote_task_id = Some(remote_task_id);
        self.status = StageStatus::InProgress;
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(StageStatus::Pending.is_active());
        assert!(StageStatus::InProgress.is_active());
        assert!(StageStatus::Succeeded.is_terminal());
        assert!(StageStatus::Failed.is_terminal());
        assert!(StageStatus::TimedOut.is_terminal());
    }

    #[test]
    fn test_enter_stage_replaces_task_and_resets_attempts() {
        let mut job = GenerationJob::new("a vase");
        job.enter_stage(Stage::Preview, "p1".into());
        job.attempt = 12;

        job.enter_stage(Stage::Refine, "r1".into());

        assert_eq!(job.stage, Stage::Refine);
        assert_eq!(job.remote_task_id.as_deref(), Some("r1"));
        assert_eq!(job.attempt, 0);
        assert_eq!(job.status, StageStatus::InProgress);
    }
}
