//! Configuration resolution for omni-brain
//!
//! Priority: CLI argument > environment variable > TOML file
//! (`~/.config/omni/brain.toml`) > compiled default. The CLI/env tiers are
//! handled by clap; the file tier is an all-optional overlay merged here.

use clap::Parser;
use omni_common::config::{config_file_path, data_local_dir, load_toml};
use omni_common::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Shipped model weights file; matches setup-dev.sh.
const MODEL_FILENAME: &str = "gemma-3-1b-it-Q8_0.gguf";

#[derive(Debug, Parser)]
#[command(name = "omni-brain", about = "Omni inference-orchestration service")]
pub struct CliArgs {
    /// Config file path (default: ~/.config/omni/brain.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bind host
    #[arg(long, env = "OMNI_BRAIN_HOST")]
    pub host: Option<String>,

    /// Bind port
    #[arg(long, env = "OMNI_BRAIN_PORT")]
    pub port: Option<u16>,

    /// Search aggregator URL
    #[arg(long, env = "OMNI_SEARX_URL")]
    pub searx_url: Option<String>,
}

/// All-optional TOML overlay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub searx_url: Option<String>,
    pub model_path: Option<PathBuf>,
    pub runtime_url: Option<String>,
    pub model: Option<String>,
    pub fast_runtime_url: Option<String>,
    pub fast_model: Option<String>,
    pub embedding_url: Option<String>,
    pub embedding_model: Option<String>,
    pub store_path: Option<PathBuf>,
    pub max_distance: Option<f64>,
    pub search_limit: Option<usize>,
    #[serde(default)]
    pub timeouts: TimeoutsFile,
    #[serde(default)]
    pub generation: GenerationFile,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeoutsFile {
    pub general_secs: Option<u64>,
    pub navigation_secs: Option<u64>,
    pub lookup_secs: Option<u64>,
    pub scrape_secs: Option<u64>,
    pub generation_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationFile {
    pub deep_max_tokens: Option<u32>,
    pub deep_temperature: Option<f32>,
    pub fast_max_tokens: Option<u32>,
    pub fast_temperature: Option<f32>,
}

/// Outbound-call timeouts. All short and fixed; a slow source degrades to
/// no enrichment instead of stalling a batch.
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub general_secs: u64,
    pub navigation_secs: u64,
    pub lookup_secs: u64,
    pub scrape_secs: u64,
    pub generation_secs: u64,
}

impl Timeouts {
    pub fn general(&self) -> Duration {
        Duration::from_secs(self.general_secs)
    }
    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_secs)
    }
    pub fn lookup(&self) -> Duration {
        Duration::from_secs(self.lookup_secs)
    }
    pub fn scrape(&self) -> Duration {
        Duration::from_secs(self.scrape_secs)
    }
    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }
}

/// Generation bounds per lane. `max_tokens` doubles as the soft timeout
/// on every model call.
#[derive(Debug, Clone)]
pub struct Generation {
    pub deep_max_tokens: u32,
    pub deep_temperature: f32,
    pub fast_max_tokens: u32,
    pub fast_temperature: f32,
    pub stop: Vec<String>,
}

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct BrainConfig {
    pub host: String,
    pub port: u16,
    pub searx_url: String,
    pub model_path: PathBuf,
    pub runtime_url: String,
    pub model: String,
    pub fast_runtime_url: String,
    pub fast_model: String,
    pub embedding_url: String,
    pub embedding_model: String,
    pub store_path: PathBuf,
    /// Semantic hits at or beyond this distance are excluded.
    pub max_distance: f64,
    pub search_limit: usize,
    pub timeouts: Timeouts,
    pub generation: Generation,
}

impl BrainConfig {
    /// Resolve the full chain: defaults, then the TOML overlay, then
    /// CLI/env values.
    pub fn resolve(cli: &CliArgs) -> Result<Self> {
        let file = match cli.config.clone().or_else(|| config_file_path("brain")) {
            Some(path) => {
                info!(path = %path.display(), "Loading config file");
                load_toml::<FileConfig>(&path)?
            }
            None => FileConfig::default(),
        };
        Ok(Self::merge(file, cli))
    }

    /// Pure merge of the file overlay and CLI values over the defaults.
    pub fn merge(file: FileConfig, cli: &CliArgs) -> Self {
        let data_dir = data_local_dir();

        let runtime_url = file
            .runtime_url
            .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
        let model = file.model.unwrap_or_else(|| "gemma-3-1b-it".to_string());

        // Fast lane defaults to the deep binding: one physical model,
        // aliased lane locks
        let fast_runtime_url = file.fast_runtime_url.unwrap_or_else(|| runtime_url.clone());
        let fast_model = file.fast_model.unwrap_or_else(|| model.clone());

        Self {
            host: cli
                .host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: cli.port.or(file.port).unwrap_or(5500),
            searx_url: cli
                .searx_url
                .clone()
                .or(file.searx_url)
                .unwrap_or_else(|| "http://127.0.0.1:8888/search".to_string()),
            model_path: file
                .model_path
                .unwrap_or_else(|| data_dir.join("ai-models").join(MODEL_FILENAME)),
            runtime_url,
            model,
            fast_runtime_url,
            fast_model,
            embedding_url: file
                .embedding_url
                .unwrap_or_else(|| "http://127.0.0.1:8081".to_string()),
            embedding_model: file
                .embedding_model
                .unwrap_or_else(|| "all-MiniLM-L6-v2".to_string()),
            store_path: file
                .store_path
                .unwrap_or_else(|| data_dir.join("ai-memory-db")),
            max_distance: file.max_distance.unwrap_or(1.1),
            search_limit: file.search_limit.unwrap_or(3),
            timeouts: Timeouts {
                general_secs: file.timeouts.general_secs.unwrap_or(5),
                navigation_secs: file.timeouts.navigation_secs.unwrap_or(3),
                lookup_secs: file.timeouts.lookup_secs.unwrap_or(4),
                scrape_secs: file.timeouts.scrape_secs.unwrap_or(5),
                generation_secs: file.timeouts.generation_secs.unwrap_or(120),
            },
            generation: Generation {
                deep_max_tokens: file.generation.deep_max_tokens.unwrap_or(1024),
                deep_temperature: file.generation.deep_temperature.unwrap_or(0.7),
                fast_max_tokens: file.generation.fast_max_tokens.unwrap_or(64),
                fast_temperature: file.generation.fast_temperature.unwrap_or(0.1),
                stop: vec![
                    "<|im_start|>".to_string(),
                    "<|im_end|>".to_string(),
                    "<|endoftext|>".to_string(),
                ],
            },
        }
    }

    /// (runtime URL, model) binding of the Deep lane.
    pub fn deep_binding(&self) -> (&str, &str) {
        (&self.runtime_url, &self.model)
    }

    /// (runtime URL, model) binding of the Fast lane.
    pub fn fast_binding(&self) -> (&str, &str) {
        (&self.fast_runtime_url, &self.fast_model)
    }
}
