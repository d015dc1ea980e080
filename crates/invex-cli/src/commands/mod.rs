//! CLI subcommands and shared wiring.

pub mod images;
pub mod process;

use anyhow::Context;

use invex_core::{InvexConfig, InvoiceExtractor, OpenAiClient};

/// Load configuration from the optional path, falling back to defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<InvexConfig> {
    match path {
        Some(path) => InvexConfig::from_file(std::path::Path::new(path))
            .with_context(|| format!("failed to load config from {path}")),
        None => Ok(InvexConfig::default()),
    }
}

/// Build the extractor from config plus the API key in the environment.
pub fn build_extractor(config: InvexConfig) -> anyhow::Result<InvoiceExtractor<OpenAiClient>> {
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
    let client = OpenAiClient::new(&config.completion, api_key)?;
    Ok(InvoiceExtractor::new(client, config))
}

/// Render a result as JSON, optionally pretty-printed.
pub fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(output)
}
