use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use ky_core::{GeneratedAsset, ProgressReport};
use crate::orchestrator::Orchestrator;
use crate::progress::Reporter;
use crate::store::KvStore;

pub enum WorkerCommand {
    Generate { prompt: String },
    Shutdown,
}

/// Runs the orchestrator on its own thread so a UI can request generations
/// without blocking. Commands go in over one channel; progress reports and
/// finished assets come back over two others, polled with `try_recv_*`
/// from the consumer's own loop. Commands queue up and run strictly in
/// order, so back-to-back prompts never race on the history.
///
/// A consumer that stops listening simply never drains the result channel;
/// completion has no other side effect, so late results are safe to drop.
pub struct GenWorker {
    command_tx: Sender<WorkerCommand>,
    progress_rx: Receiver<ProgressReport>,
    result_rx: Receiver<GeneratedAsset>,
    thread_handle: Option<JoinHandle<()>>,
}

impl GenWorker {
    /// Spawn the worker thread. `make_orchestrator` runs on that thread
    /// and receives the reporter the orchestrator publishes progress
    /// through.
    pub fn spawn<S, F>(make_orchestrator: F) -> Self
    where
        S: KvStore + 'static,
        F: FnOnce(Reporter) -> Orchestrator<S> + Send + 'static,
    {
        let (command_tx, command_rx) = channel::<WorkerCommand>();
        let (progress_tx, progress_rx) = channel::<ProgressReport>();
        let (result_tx, result_rx) = channel::<GeneratedAsset>();

        let thread_handle = thread::spawn(move || {
            let mut orchestrator = make_orchestrator(Reporter::new(progress_tx));

            loop {
                match command_rx.recv() {
                    Ok(WorkerCommand::Generate { prompt }) => {
                        let asset = orchestrator.run(&prompt);
                        // The receiver may already be gone; drop the result.
                        let _ = result_tx.send(asset);
                    }
                    Ok(WorkerCommand::Shutdown) | Err(_) => {
                        break;
                    }
                }
            }
        });

        Self {
            command_tx,
            progress_rx,
            result_rx,
            thread_handle: Some(thread_handle),
        }
    }

    pub fn generate(&self, prompt: impl Into<String>) -> Result<(), String> {
        self.command_tx
            .send(WorkerCommand::Generate {
                prompt: prompt.into(),
            })
            .map_err(|e| format!("Failed to send prompt to worker: {}", e))
    }

    pub fn try_recv_progress(&self) -> Option<ProgressReport> {
        self.progress_rx.try_recv().ok()
    }

    pub fn try_recv_result(&self) -> Option<GeneratedAsset> {
        self.result_rx.try_recv().ok()
    }

    /// Blocks until the next finished asset arrives or the worker dies.
    pub fn recv_result(&self) -> Option<GeneratedAsset> {
        self.result_rx.recv().ok()
    }

    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GenWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
