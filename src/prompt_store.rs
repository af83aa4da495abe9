//! Prompt template store.
//!
//! Templates are [minijinja] sources addressed by name. The built-in store
//! ships the `rag-prompt` template and can be pointed at a file that
//! overrides it (`rag.prompt_path`).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::RagConfig;

/// Built-in question-answering template. Variables: `question`, `context`.
pub const RAG_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.
Question: {{ question }}
Context: {{ context }}
Answer:";

/// Resolves prompt templates by name.
#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<String>;
}

/// Store serving built-in templates, with optional file overrides.
pub struct BuiltinPromptStore {
    overrides: Vec<(String, PathBuf)>,
}

impl BuiltinPromptStore {
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Store honoring `rag.prompt_path` for `rag.prompt_name`.
    pub fn from_config(config: &RagConfig) -> Self {
        let mut store = Self::new();
        if let Some(path) = &config.prompt_path {
            store = store.with_override(&config.prompt_name, path.clone());
        }
        store
    }

    pub fn with_override(mut self, name: &str, path: PathBuf) -> Self {
        self.overrides.push((name.to_string(), path));
        self
    }
}

impl Default for BuiltinPromptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptStore for BuiltinPromptStore {
    async fn fetch(&self, name: &str) -> Result<String> {
        if let Some((_, path)) = self.overrides.iter().find(|(n, _)| n == name) {
            return tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read prompt template {}", path.display()));
        }

        match name {
            "rag-prompt" => Ok(RAG_PROMPT.to_string()),
            other => bail!("no prompt template named '{}'", other),
        }
    }
}
