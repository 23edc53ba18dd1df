use log::{info, warn};
use ky_core::{GeneratedAsset, Stage};
use crate::client::GenService;
use crate::error::StageError;
use crate::history::History;
use crate::job::GenerationJob;
use crate::poller::{Clock, StageOutcome, StagePoller};
use crate::progress::{ProgressEstimator, Reporter};
use crate::schemas::{StageParams, StatusResponse, SubmitRequest};
use crate::store::KvStore;

/// Locator committed when the remote pipeline fails; the renderer ships a
/// built-in stand-in mesh under this name.
pub const FALLBACK_MODEL_REF: &str = "builtin://fallback-cube.glb";

/// Sequences the preview and refine stages for one prompt and commits the
/// outcome to the history. One job at a time per instance; `run` takes
/// `&mut self` so a second call cannot start while one is in flight.
pub struct Orchestrator<S: KvStore> {
    service: Box<dyn GenService>,
    clock: Box<dyn Clock>,
    poller: StagePoller,
    history: History<S>,
    reporter: Reporter,
}

impl<S: KvStore> Orchestrator<S> {
    pub fn new(
        service: Box<dyn GenService>,
        clock: Box<dyn Clock>,
        poller: StagePoller,
        history: History<S>,
        reporter: Reporter,
    ) -> Self {
        Self {
            service,
            clock,
            poller,
            history,
            reporter,
        }
    }

    pub fn history(&self) -> &History<S> {
        &self.history
    }

    /// Run one generation job start to finish. Never fails: any error on
    /// the way is downgraded to a placeholder result so the caller always
    /// has something to put in the scene.
    pub fn run(&mut self, prompt: &str) -> GeneratedAsset {
        let mut job = GenerationJob::new(prompt);
        let mut estimator = ProgressEstimator::new();

        match self.run_stages(&mut job, &mut estimator) {
            Ok((model_ref, texture_ref)) => {
                job.percent = estimator.complete();
                self.reporter.publish(job.percent, Stage::Refine.label(), "Done");
                self.commit(GeneratedAsset::standard(prompt, model_ref, texture_ref))
            }
            Err(e) => {
                warn!("generation for '{prompt}' fell back to a placeholder: {e}");
                job.percent = estimator.complete();
                self.reporter.publish(
                    job.percent,
                    "fallback",
                    "Generation failed, placed a stand-in model",
                );
                // All fallbacks share one locator, so history dedup may
                // keep an earlier degraded entry; the caller still gets
                // this run's asset with its own prompt.
                let fallback = GeneratedAsset::degraded(prompt, FALLBACK_MODEL_REF);
                self.commit(fallback.clone());
                fallback
            }
        }
    }

    fn run_stages(
        &self,
        job: &mut GenerationJob,
        estimator: &mut ProgressEstimator,
    ) -> Result<(String, Option<String>), StageError> {
        self.reporter
            .publish(estimator.percent(), Stage::Preview.label(), "Submitting preview");
        let preview_task = self.submit(&job.prompt, Stage::Preview, None)?;
        job.enter_stage(Stage::Preview, preview_task.clone());
        job.percent = estimator.stage_submitted(Stage::Preview);
        self.reporter
            .publish(job.percent, Stage::Preview.label(), "Preview queued");

        self.await_stage(job, estimator)?;
        job.percent = estimator.preview_done();
        self.reporter
            .publish(job.percent, Stage::Refine.label(), "Preview ready, refining");

        // Refine reworks the preview output, so it must carry that task id.
        let refine_task = self.submit(&job.prompt, Stage::Refine, Some(preview_task))?;
        job.enter_stage(Stage::Refine, refine_task.clone());
        job.percent = estimator.stage_submitted(Stage::Refine);
        self.reporter
            .publish(job.percent, Stage::Refine.label(), "Refine queued");

        let payload = self.await_stage(job, estimator)?;
        let texture_ref = payload.texture_ref().map(str::to_string);

        match payload.model_ref() {
            Some(model_ref) => Ok((model_ref.to_string(), texture_ref)),
            None => {
                // Succeeded without a locator; the proxy endpoint is the
                // second source of truth before giving up.
                info!("refine task {refine_task} succeeded without a model locator, probing proxy");
                match self.service.probe_proxy(&refine_task) {
                    Ok(Some(proxy_ref)) => Ok((proxy_ref, texture_ref)),
                    Ok(None) => Err(StageError::MissingResult),
                    Err(e) => {
                        warn!("proxy probe for {refine_task} failed: {e}");
                        Err(StageError::MissingResult)
                    }
                }
            }
        }
    }

    fn await_stage(
        &self,
        job: &mut GenerationJob,
        estimator: &mut ProgressEstimator,
    ) -> Result<StatusResponse, StageError> {
        match self.poller.await_terminal(
            self.service.as_ref(),
            self.clock.as_ref(),
            job,
            estimator,
            &self.reporter,
        ) {
            StageOutcome::Succeeded(payload) => Ok(payload),
            StageOutcome::Failed(reason) => Err(StageError::Remote(reason)),
            StageOutcome::TimedOut { attempts } => Err(StageError::Timeout { attempts }),
        }
    }

    fn submit(
        &self,
        prompt: &str,
        stage: Stage,
        preview_task_id: Option<String>,
    ) -> Result<String, StageError> {
        let request = SubmitRequest {
            prompt: prompt.to_string(),
            stage,
            stage_params: StageParams { preview_task_id },
        };
        self.service.submit(&request).map_err(StageError::Submission)
    }

    fn commit(&self, asset: GeneratedAsset) -> GeneratedAsset {
        match self.history.add(asset.clone()) {
            Ok(stored) => stored,
            Err(e) => {
                // A persistence failure must not cost the caller the result.
                warn!("failed to persist history: {e}");
                asset
            }
        }
    }
}
