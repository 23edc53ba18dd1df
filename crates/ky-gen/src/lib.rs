pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod job;
pub mod orchestrator;
pub mod poller;
pub mod progress;
pub mod schemas;
pub mod store;
pub mod worker;

pub use orchestrator::{Orchestrator, FALLBACK_MODEL_REF};
pub use worker::GenWorker;
