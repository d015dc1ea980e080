//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Completion service configuration.
    pub completion: CompletionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// Completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL of the chat-completion API.
    pub api_base: String,

    /// Model used for text-only extraction.
    pub text_model: String,

    /// Model used for image-based extraction.
    pub vision_model: String,

    /// Sampling temperature. Kept at zero for deterministic field mapping.
    pub temperature: f32,

    /// Overall HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            text_model: "gpt-3.5-turbo".to_string(),
            vision_model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// PDF text-assembly tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Horizontal gap (points) below which adjacent glyph runs are joined
    /// without a space.
    pub x_tolerance: f32,

    /// Vertical distance (points) within which glyph runs belong to the
    /// same line.
    pub y_tolerance: f32,

    /// Fallback glyph advance in points, used when no font size is in
    /// effect.
    pub x_density: f32,

    /// Fallback line height in points, used to size match regions when no
    /// font size is in effect.
    pub y_density: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            x_density: 7.25,
            y_density: 13.0,
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
