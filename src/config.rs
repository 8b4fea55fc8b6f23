use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recorder: RecorderConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecorderConfig {
    /// Sampler cadence in milliseconds
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub sessions_path: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
