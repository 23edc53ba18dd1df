use std::sync::mpsc::channel;
use std::time::Duration;
use log::info;
use ky_core::ProgressReport;
use ky_gen::client::HttpGenClient;
use ky_gen::config::GenConfig;
use ky_gen::history::History;
use ky_gen::orchestrator::Orchestrator;
use ky_gen::poller::{StagePoller, SystemClock};
use ky_gen::progress::Reporter;
use ky_gen::store::JsonFileStore;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.is_empty() {
        anyhow::bail!("usage: ky-gen <prompt>");
    }

    let config = GenConfig::load()?;
    info!("Generating '{}' via {}", prompt, config.api_url);

    let (progress_tx, progress_rx) = channel::<ProgressReport>();
    let printer = std::thread::spawn(move || {
        for report in progress_rx {
            println!("[{:>5.1}%] {:<8} {}", report.percent, report.stage_label, report.message);
        }
    });

    let mut orchestrator = Orchestrator::new(
        Box::new(HttpGenClient::new(config.api_url.clone())),
        Box::new(SystemClock),
        StagePoller::new(
            Duration::from_secs(config.poll_interval_secs),
            config.max_poll_attempts,
        ),
        History::new(JsonFileStore::new(&config.data_dir)),
        Reporter::new(progress_tx),
    );

    let asset = orchestrator.run(&prompt);
    let history_len = orchestrator.history().load().map(|l| l.len()).unwrap_or(0);

    drop(orchestrator);
    let _ = printer.join();

    println!("model:   {}", asset.model_ref);
    if let Some(texture_ref) = &asset.texture_ref {
        println!("texture: {}", texture_ref);
    }
    println!("quality: {:?} ({} result(s) in history)", asset.quality, history_len);

    Ok(())
}
