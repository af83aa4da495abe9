//! TOML configuration.
//!
//! Every collaborator receives its section of [`Config`] at construction
//! time. Credentials are resolved once, from the config file or from the
//! environment variable it names, when the services are built.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub moderator: ModeratorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_provider")]
    pub provider: String,
    #[serde(default = "default_completion_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_completion_provider(),
            model: default_completion_model(),
            base_url: default_openai_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_completion_timeout_secs(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl CompletionConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// Resolve the API key: explicit `api_key` first, then `$api_key_env`.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

fn default_completion_provider() -> String {
    "openai".to_string()
}
fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_completion_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: Option<String>,
    /// Base URL; defaults per provider (OpenAI API or local Ollama).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            url: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_embedding_timeout_secs(),
            max_retries: 0,
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}
fn default_embedding_model() -> Option<String> {
    Some("text-embedding-3-small".to_string())
}
fn default_embedding_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoaderConfig {
    #[serde(default = "default_loader_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_loader_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_loader_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("tertulia/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct RagConfig {
    /// The fixed question every `/rag/` request answers.
    #[serde(default = "default_question")]
    pub question: String,
    #[serde(default = "default_prompt_name")]
    pub prompt_name: String,
    /// Optional template file overriding the built-in prompt.
    #[serde(default)]
    pub prompt_path: Option<PathBuf>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            question: default_question(),
            prompt_name: default_prompt_name(),
            prompt_path: None,
        }
    }
}

fn default_question() -> String {
    "¿Cuáles son las noticias o ideas más importantes de esta página? Resúmelas brevemente."
        .to_string()
}
fn default_prompt_name() -> String {
    "rag-prompt".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ModeratorConfig {
    /// Run persona completions concurrently. Results keep the fixed order.
    #[serde(default)]
    pub parallel: bool,
}

fn resolve_api_key(explicit: Option<&str>, env_name: &str) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    std::env::var(env_name)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", env_name))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be smaller than chunking.chunk_size");
    }

    // Validate retrieval
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    // Validate completion
    match config.completion.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown completion provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.completion.is_enabled() && config.completion.model.trim().is_empty() {
        anyhow::bail!("completion.model must not be empty");
    }
    if config.completion.timeout_secs == 0 {
        anyhow::bail!("completion.timeout_secs must be > 0");
    }

    // Validate embedding
    match config.embedding.provider.as_str() {
        "disabled" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, or ollama.",
            other
        ),
    }
    let model_missing = config
        .embedding
        .model
        .as_deref()
        .map_or(true, |m| m.trim().is_empty());
    if config.embedding.is_enabled() && model_missing {
        anyhow::bail!(
            "embedding.model must be specified when provider is '{}'",
            config.embedding.provider
        );
    }
    if config.embedding.timeout_secs == 0 {
        anyhow::bail!("embedding.timeout_secs must be > 0");
    }

    if config.loader.timeout_secs == 0 {
        anyhow::bail!("loader.timeout_secs must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[server]
bind = "127.0.0.1:8000"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.completion.provider, "openai");
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(
            config.embedding.model.as_deref(),
            Some("text-embedding-3-small")
        );
        assert_eq!(config.embedding.max_retries, 0);
        assert!(!config.moderator.parallel);
        assert_eq!(config.rag.prompt_name, "rag-prompt");
    }

    #[test]
    fn test_missing_server_section_rejected() {
        assert!(parse_config("[chunking]\nchunk_size = 10\n").is_err());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let toml = format!("{}\n[chunking]\nchunk_size = 100\nchunk_overlap = 100\n", MINIMAL);
        let err = parse_config(&toml).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let toml = format!("{}\n[retrieval]\ntop_k = 0\n", MINIMAL);
        assert!(parse_config(&toml).is_err());
    }

    #[test]
    fn test_unknown_embedding_provider_rejected() {
        let toml = format!("{}\n[embedding]\nprovider = \"magic\"\nmodel = \"m\"\n", MINIMAL);
        let err = parse_config(&toml).unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_embedding_model_required_when_enabled() {
        let toml = format!("{}\n[embedding]\nprovider = \"openai\"\nmodel = \"\"\n", MINIMAL);
        let err = parse_config(&toml).unwrap_err();
        assert!(err.to_string().contains("embedding.model"));
    }

    #[test]
    fn test_unknown_completion_provider_rejected() {
        let toml = format!("{}\n[completion]\nprovider = \"oracle\"\n", MINIMAL);
        assert!(parse_config(&toml).is_err());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = CompletionConfig {
            api_key: Some("sk-test".to_string()),
            api_key_env: "TERTULIA_TEST_UNSET_KEY".to_string(),
            ..CompletionConfig::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_missing_api_key_names_variable() {
        let config = CompletionConfig {
            api_key_env: "TERTULIA_TEST_DEFINITELY_UNSET".to_string(),
            ..CompletionConfig::default()
        };
        let err = config.resolve_api_key().unwrap_err();
        assert!(err.to_string().contains("TERTULIA_TEST_DEFINITELY_UNSET"));
    }
}
