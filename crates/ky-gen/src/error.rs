use thiserror::Error;
use crate::client::ClientError;

/// Terminal failure of one stage. None of these reach the caller of
/// `Orchestrator::run`; each routes the job to the fallback commit.
/// Transient poll faults are not here on purpose, the poller absorbs them
/// inside its attempt budget.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage submission rejected: {0}")]
    Submission(#[source] ClientError),

    #[error("remote service reported failure: {0}")]
    Remote(String),

    #[error("no terminal status after {attempts} poll attempts")]
    Timeout { attempts: u32 },

    #[error("stage succeeded without a usable model locator")]
    MissingResult,
}
