//! External collaborators wired from configuration.
//!
//! [`Services`] bundles every outbound dependency behind its trait so the
//! HTTP layer, the CLI, and tests share one construction point. Nothing in
//! here holds per-request state.

use anyhow::{Context, Result};
use std::sync::Arc;

use tertulia_core::persona::PersonaRegistry;
use tertulia_core::routing::{ResponderSelector, SubstringSelector};

use crate::completion::{create_completion_client, CompletionClient};
use crate::config::Config;
use crate::embedding::{create_embedder, Embedder};
use crate::loader::{HttpPageLoader, PageLoader};
use crate::prompt_store::{BuiltinPromptStore, PromptStore};

#[derive(Clone)]
pub struct Services {
    pub completion: Arc<dyn CompletionClient>,
    pub embedder: Arc<dyn Embedder>,
    pub loader: Arc<dyn PageLoader>,
    pub prompts: Arc<dyn PromptStore>,
    pub personas: PersonaRegistry,
    pub selector: Arc<dyn ResponderSelector>,
}

impl Services {
    /// Build the real HTTP-backed collaborators described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let completion = create_completion_client(&config.completion)
            .context("Failed to create completion client")?;
        let embedder =
            create_embedder(&config.embedding).context("Failed to create embedding provider")?;
        let loader = HttpPageLoader::new(&config.loader).context("Failed to create page loader")?;

        tracing::info!(
            completion_model = completion.model_name(),
            embedding_model = embedder.model_name(),
            "services ready"
        );

        Ok(Self {
            completion,
            embedder,
            loader: Arc::new(loader),
            prompts: Arc::new(BuiltinPromptStore::from_config(&config.rag)),
            personas: PersonaRegistry::builtin(),
            selector: Arc::new(SubstringSelector),
        })
    }
}
