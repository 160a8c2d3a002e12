use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::feed::Category;
use crate::models::AccountId;

/// Environment variable overriding `ledger.api_key`.
pub const LEDGER_API_KEY_ENV: &str = "SANDBANK_API_KEY";
/// Environment variable overriding `assistant.api_key`.
pub const ASSISTANT_API_KEY_ENV: &str = "CLAUDE_API_KEY";

fn default_ledger_base_url() -> String {
    "http://api.nessieisreal.com".to_string()
}

/// Connection settings for the sandbox ledger API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub base_url: String,

    /// Sent as the `key` query parameter. Never serialized back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Reference account for the feed and the payer for submissions.
    pub default_account_id: Option<AccountId>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: default_ledger_base_url(),
            api_key: None,
            default_account_id: None,
        }
    }
}

/// Feed presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// How many more entries each "load more" reveals.
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: crate::feed::WINDOW_INCREMENT,
        }
    }
}

/// User-defined category rule, checked before the built-in keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Regex matched against the transaction description.
    pub pattern: String,
    pub category: Category,
}

fn default_system_prompt() -> String {
    "Eres un asistente de app bancaria. Respondes de forma concisa y clara a las \
     preguntas del usuario sobre sus finanzas personales, gastos, ingresos y \
     presupuestos. Utilizas un lenguaje amigable y profesional. Limita tus \
     respuestas a no mas de 5 lineas de texto."
        .to_string()
}

/// Settings for the chat relay's upstream completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub base_url: String,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: None,
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 800,
            temperature: 0.8,
            system_prompt: default_system_prompt(),
        }
    }
}

/// Pay-service catalog shipped with the demo: service key -> merchant id.
pub fn default_merchants() -> BTreeMap<String, AccountId> {
    [
        ("internet", "57cf75cea73e494d8675ec49"),
        ("luz", "57cf75cea73e494d8675ec4a"),
        ("agua", "57cf75cea73e494d8675ec4b"),
        ("telefono", "57cf75cea73e494d8675ec4c"),
    ]
    .into_iter()
    .map(|(key, id)| (key.to_string(), AccountId::from_string(id)))
    .collect()
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub feed: FeedConfig,

    #[serde(default = "default_merchants")]
    pub merchants: BTreeMap<String, AccountId>,

    #[serde(default)]
    pub categories: Vec<CategoryRule>,

    pub assistant: AssistantConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            feed: FeedConfig::default(),
            merchants: default_merchants(),
            categories: Vec::new(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply API key overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply API key overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty(LEDGER_API_KEY_ENV) {
            self.ledger.api_key = Some(key);
        }
        if let Some(key) = non_empty(ASSISTANT_API_KEY_ENV) {
            self.assistant.api_key = Some(key);
        }
        self
    }

    pub fn merchant(&self, service: &str) -> Option<&AccountId> {
        self.merchants.get(&service.trim().to_lowercase())
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./sandbank.toml` if it exists in current directory
/// 2. `~/.config/sandbank/sandbank.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("sandbank.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sandbank").join("sandbank.toml");
    }

    local_config
}
