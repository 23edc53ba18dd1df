use std::env;
use std::path::PathBuf;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct GenConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
}

impl GenConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("KUCHIYOSE_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());

        let data_dir = env::var("KUCHIYOSE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("outputs/history"));

        let poll_interval_secs = env::var("KUCHIYOSE_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("KUCHIYOSE_POLL_INTERVAL_SECS must be a number")?;

        let max_poll_attempts = env::var("KUCHIYOSE_MAX_POLL_ATTEMPTS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("KUCHIYOSE_MAX_POLL_ATTEMPTS must be a number")?;

        Ok(Self {
            api_url,
            data_dir,
            poll_interval_secs,
            max_poll_attempts,
        })
    }
}
