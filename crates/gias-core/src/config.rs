use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Greeting the assistant opens every session with.
pub const DEFAULT_GREETING: &str =
    "Hello! I'm your AI summarization assistant. Upload a paper and tell me what you need summarized!";

/// Bot reply appended once a send has been acknowledged.
pub const DEFAULT_ACKNOWLEDGMENT: &str =
    "Processing your request... (This is a placeholder response)";

/// Top-level configuration for the Give-It-A-Summary front end.
///
/// Loaded from `~/.gias/config.toml` by default. Every section is optional
/// and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiasConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub attachments: AttachmentConfig,
}

impl GiasConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GiasConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Chat session behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Bot message the session opens with. Empty starts with an empty timeline.
    pub greeting: String,
    /// Delay before the deferred acknowledgment fires, in milliseconds.
    pub ack_delay_ms: u64,
    /// Text of the bot reply for an acknowledged request.
    pub acknowledgment_text: String,
    /// Text of the bot reply for a request that is still being processed.
    pub progress_text: String,
}

impl ChatConfig {
    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }

    pub fn greeting(&self) -> Option<&str> {
        let greeting = self.greeting.trim();
        (!greeting.is_empty()).then_some(greeting)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            ack_delay_ms: 1000,
            acknowledgment_text: DEFAULT_ACKNOWLEDGMENT.to_string(),
            progress_text: "Still working on your request...".to_string(),
        }
    }
}

/// File selection filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentConfig {
    /// Extensions offered by the file picker, with leading dot.
    pub accepted_extensions: Vec<String>,
}

impl AttachmentConfig {
    /// Whether `file_name` carries one of the accepted extensions (case-insensitive).
    pub fn accepts(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.accepted_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            accepted_extensions: [".pdf", ".docx", ".txt", ".xlsx", ".xls", ".csv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
