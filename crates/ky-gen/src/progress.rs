use std::sync::mpsc::Sender;
use rand::Rng;
use ky_core::{ProgressReport, Stage};

// Fixed bands on the single 0-100 scale: two roughly-equal phases with a
// visible handoff at 50.
const PREVIEW_SUBMIT_PERCENT: f32 = 20.0;
const PREVIEW_CEILING: f32 = 49.0;
const HANDOFF_PERCENT: f32 = 50.0;
const REFINE_SUBMIT_PERCENT: f32 = 60.0;
const REFINE_CEILING: f32 = 99.0;

/// Turns sparse, stage-scoped remote progress numbers into one
/// monotonically non-decreasing percentage for the whole job. Remote
/// samples are mapped into the active stage's band; ticks without a sample
/// get a small synthetic nudge so the bar never looks frozen.
pub struct ProgressEstimator {
    percent: f32,
}

impl ProgressEstimator {
    pub fn new() -> Self {
        Self { percent: 0.0 }
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    fn raise_to(&mut self, target: f32) -> f32 {
        if target > self.percent {
            self.percent = target;
        }
        self.percent
    }

    /// Assigned as soon as the stage is queued, not tied to any remote
    /// signal.
    pub fn stage_submitted(&mut self, stage: Stage) -> f32 {
        match stage {
            Stage::Preview => self.raise_to(PREVIEW_SUBMIT_PERCENT),
            Stage::Refine => self.raise_to(REFINE_SUBMIT_PERCENT),
        }
    }

    /// Preview finished, entering the handoff band.
    pub fn preview_done(&mut self) -> f32 {
        self.raise_to(HANDOFF_PERCENT)
    }

    /// Real remote sample for the active stage.
    pub fn sample(&mut self, stage: Stage, remote_progress: f32) -> f32 {
        let target = match stage {
            Stage::Preview => (20.0 + remote_progress * 0.3).min(PREVIEW_CEILING),
            Stage::Refine => (60.0 + remote_progress * 0.4).min(REFINE_CEILING),
        };
        self.raise_to(target)
    }

    /// No sample this tick. The step size is cosmetic; what matters is
    /// that it never decreases and never crosses the stage ceiling.
    pub fn synthetic_tick(&mut self, stage: Stage) -> f32 {
        let ceiling = match stage {
            Stage::Preview => PREVIEW_CEILING,
            Stage::Refine => REFINE_CEILING,
        };
        let step = rand::thread_rng().gen_range(0.2f32..0.9f32);
        let target = (self.percent + step).min(ceiling);
        self.raise_to(target)
    }

    /// Whole job succeeded (or fell back), bar goes to the end.
    pub fn complete(&mut self) -> f32 {
        self.percent = 100.0;
        self.percent
    }
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes progress reports to whoever is listening. Best-effort: a
/// dropped or absent receiver is ignored.
#[derive(Clone, Default)]
pub struct Reporter {
    tx: Option<Sender<ProgressReport>>,
}

impl Reporter {
    pub fn new(tx: Sender<ProgressReport>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn publish(&self, percent: f32, stage_label: &str, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(ProgressReport {
                percent,
                stage_label: stage_label.to_string(),
                message: message.into(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_band_mapping() {
        let mut estimator = ProgressEstimator::new();
        estimator.stage_submitted(Stage::Preview);

        assert_eq!(estimator.sample(Stage::Preview, 10.0), 23.0);
        assert_eq!(estimator.sample(Stage::Preview, 55.0), 36.5);
        // band ceiling, even at remote 100
        assert_eq!(estimator.sample(Stage::Preview, 100.0), 49.0);
    }

    #[test]
    fn test_refine_band_mapping() {
        let mut estimator = ProgressEstimator::new();
        estimator.preview_done();
        estimator.stage_submitted(Stage::Refine);

        assert_eq!(estimator.sample(Stage::Refine, 50.0), 80.0);
        assert_eq!(estimator.sample(Stage::Refine, 100.0), 99.0);
    }

    #[test]
    fn test_never_decreases() {
        let mut estimator = ProgressEstimator::new();
        estimator.stage_submitted(Stage::Preview);

        let high = estimator.sample(Stage::Preview, 80.0);
        let after_low = estimator.sample(Stage::Preview, 5.0);
        assert_eq!(after_low, high);
    }

    #[test]
    fn test_synthetic_ticks_stay_inside_the_band() {
        let mut estimator = ProgressEstimator::new();
        estimator.stage_submitted(Stage::Preview);
        estimator.sample(Stage::Preview, 95.0);

        let mut previous = estimator.percent();
        for _ in 0..200 {
            let percent = estimator.synthetic_tick(Stage::Preview);
            assert!(percent >= previous);
            assert!(percent <= 49.0);
            previous = percent;
        }
    }

    #[test]
    fn test_handoff_and_completion() {
        let mut estimator = ProgressEstimator::new();
        estimator.stage_submitted(Stage::Preview);
        estimator.sample(Stage::Preview, 100.0);

        assert_eq!(estimator.preview_done(), 50.0);
        assert_eq!(estimator.stage_submitted(Stage::Refine), 60.0);
        assert_eq!(estimator.complete(), 100.0);
    }

    #[test]
    fn test_reporter_without_receiver_is_silent() {
        Reporter::disabled().publish(10.0, "preview", "still going");

        let (tx, rx) = std::sync::mpsc::channel();
        let reporter = Reporter::new(tx);
        drop(rx);
        reporter.publish(10.0, "preview", "receiver is gone");
    }
}
