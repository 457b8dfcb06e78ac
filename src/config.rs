//! Runtime configuration assembled from the command line.

use std::time::Duration;

use crate::stats::DEFAULT_KMER_SIZE;

/// Default text-generation endpoint (a local Ollama server).
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Where and how prompts are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Full URL of the generate endpoint
    pub endpoint: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Request timeout; `None` keeps the HTTP client default
    pub timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }
}

/// Presentation settings for the terminal UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiConfig {
    /// Use Unicode glyphs instead of plain ASCII
    pub fancy_glyphs: bool,
    /// Initial k-mer slider position
    pub kmer_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fancy_glyphs: true,
            kmer_size: DEFAULT_KMER_SIZE,
        }
    }
}
