use anyhow::{Context, Result, bail};
use serde::Serialize;

/// Output format for structured data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text for humans
    #[default]
    Text,
    /// JSON - machine-parseable
    Json,
}

impl OutputFormat {
    /// Serialize data to the requested format
    pub fn serialize<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(data).context("JSON serialization failed"),
            // Text output is rendered by each command
            Self::Text => bail!("Text format should not use serialize()"),
        }
    }
}
