use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carscout_core::{
    create_llm_client, load_config_or_default, metrics, validate_config, CacheStore,
    CollectionReport, Collector, JsonFileStore, LlmClient,
};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "CARSCOUT_CONFIG";

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(report) => match render_directory(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                println!("An error occurred: {:#}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Collection failed: {:#}", e);
            println!("An error occurred: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<CollectionReport> {
    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("carscout.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Cache root: {:?}", config.cache.root);
    info!(
        "Model: {:?} {} (market: {}, base year: {})",
        config.llm.provider,
        config.llm.model,
        config.collection.market,
        config.collection.effective_base_year()
    );

    let client: Arc<dyn LlmClient> =
        create_llm_client(&config.llm).context("Failed to create model client")?;
    let store: Arc<dyn CacheStore> = Arc::new(JsonFileStore::new(&config.cache.root));

    let collector = Collector::from_config(client, store, &config);
    let result = collector.run().await;

    if let Some(path) = &config.metrics.textfile {
        if let Err(e) = write_metrics_textfile(path) {
            warn!("Failed to write metrics to {:?}: {:#}", path, e);
        }
    }

    Ok(result?)
}

fn render_directory(report: &CollectionReport) -> Result<String> {
    serde_json::to_string_pretty(&report.directory).context("Failed to render directory")
}

fn write_metrics_textfile(path: &Path) -> Result<()> {
    std::fs::write(path, metrics::encode_metrics())
        .with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carscout_core::ManufacturerDirectory;
    use tempfile::TempDir;

    #[test]
    fn test_render_directory_is_pretty_json() {
        let report = CollectionReport {
            directory: ManufacturerDirectory::new(vec!["Kia".to_string()]),
            ..Default::default()
        };

        let text = render_directory(&report).unwrap();
        assert!(text.contains("\n  \"manufacturers\""));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["manufacturers"][0], "Kia");
    }

    #[test]
    fn test_write_metrics_textfile() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("carscout.prom");

        metrics::DETAIL_FILES_WRITTEN.inc();
        write_metrics_textfile(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("carscout_detail_files_written_total"));
    }
}
