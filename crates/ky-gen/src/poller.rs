use std::time::Duration;
use log::{debug, warn};
use crate::client::GenService;
use crate::job::{GenerationJob, StageStatus};
use crate::progress::{ProgressEstimator, Reporter};
use crate::schemas::{RemoteStatus, StatusResponse};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Sleep primitive the poll loop suspends on, injectable so tests run on
/// virtual time.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, PartialEq)]
pub enum StageOutcome {
    Succeeded(StatusResponse),
    Failed(String),
    TimedOut { attempts: u32 },
}

/// Polls one stage at a fixed interval until a terminal status or the
/// attempt budget runs out. No backoff: generation times vary wildly and a
/// steady cadence keeps the progress signal predictable.
pub struct StagePoller {
    interval: Duration,
    max_attempts: u32,
}

impl StagePoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Drive the job's active stage to a terminal outcome. Transport-level
    /// poll failures are absorbed silently; they only spend the shared
    /// attempt budget. A business-level FAILED stops immediately.
    pub fn await_terminal(
        &self,
        service: &dyn GenService,
        clock: &dyn Clock,
        job: &mut GenerationJob,
        estimator: &mut ProgressEstimator,
        reporter: &Reporter,
    ) -> StageOutcome {
        let stage = job.stage;
        let Some(task_id) = job.remote_task_id.clone() else {
            job.status = StageStatus::Failed;
            return StageOutcome::Failed("no active remote task for stage".into());
        };

        while job.attempt < self.max_attempts {
            job.attempt += 1;

            match service.poll(&task_id) {
                Err(e) => {
                    warn!(
                        "poll attempt {} for {} task {} failed: {}",
                        job.attempt,
                        stage.label(),
                        task_id,
                        e
                    );
                    // The tuple is updated on every tick, outage or not;
                    // only the attempt budget notices the fault.
                    let percent = estimator.synthetic_tick(stage);
                    job.percent = percent;
                    reporter.publish(
                        percent,
                        stage.label(),
                        format!("Generating {}...", stage.label()),
                    );
                }
                Ok(response) => match response.status {
                    RemoteStatus::Succeeded => {
                        debug!(
                            "{} task {} succeeded after {} attempts",
                            stage.label(),
                            task_id,
                            job.attempt
                        );
                        job.status = StageStatus::Succeeded;
                        return StageOutcome::Succeeded(response);
                    }
                    RemoteStatus::Failed => {
                        job.status = StageStatus::Failed;
                        return StageOutcome::Failed(format!(
                            "remote reported {} stage failed",
                            stage.label()
                        ));
                    }
                    RemoteStatus::Running => {
                        let percent = match response.progress {
                            Some(p) => estimator.sample(stage, p),
                            None => estimator.synthetic_tick(stage),
                        };
                        job.percent = percent;
                        reporter.publish(
                            percent,
                            stage.label(),
                            format!("Generating {}...", stage.label()),
                        );
                    }
                },
            }

            if job.attempt < self.max_attempts {
                clock.sleep(self.interval);
            }
        }

        job.status = StageStatus::TimedOut;
        StageOutcome::TimedOut {
            attempts: self.max_attempts,
        }
    }
}

impl Default for StagePoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}
