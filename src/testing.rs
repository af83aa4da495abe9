//! Test doubles for the external collaborators.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use tertulia_core::models::{ChatMessage, Role};
use tertulia_core::persona::PersonaRegistry;
use tertulia_core::routing::SubstringSelector;

use crate::completion::{CompletionClient, CompletionError};
use crate::config::{parse_config, Config};
use crate::embedding::Embedder;
use crate::loader::PageLoader;
use crate::prompt_store::{BuiltinPromptStore, PromptStore};
use crate::services::Services;

type Script = dyn Fn(&[ChatMessage]) -> Result<String, CompletionError> + Send + Sync;

/// Completion client answering from a closure and recording every call.
pub struct ScriptedCompletion {
    script: Box<Script>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletion {
    pub fn new(
        script: impl Fn(&[ChatMessage]) -> Result<String, CompletionError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answers persona calls with `"<display name> dice: ..."` and
    /// classification calls with `classification`.
    pub fn personas(classification: &'static str) -> Arc<Self> {
        Self::new(move |messages| {
            let system = messages[0].content.as_str();
            if system == crate::moderator::CLASSIFIER_SYSTEM_PROMPT {
                return Ok(classification.to_string());
            }
            let persona = PersonaRegistry::builtin()
                .all()
                .iter()
                .find(|p| p.system_prompt == system)
                .map(|p| p.display_name)
                .unwrap_or("?");
            Ok(format!("{} dice: {}", persona, last_user(messages)))
        })
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        (self.script)(messages)
    }
}

/// Content of the last user-role message.
pub fn last_user(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

pub fn provider_error(message: &str) -> CompletionError {
    CompletionError::Provider {
        status: 500,
        message: message.to_string(),
    }
}

/// Loader returning fixed text, or failing with a fixed message.
pub struct StaticPageLoader(pub Result<String, String>);

#[async_trait]
impl PageLoader for StaticPageLoader {
    async fn load(&self, _url: &Url) -> Result<String> {
        match &self.0 {
            Ok(text) => Ok(text.clone()),
            Err(msg) => bail!("{}", msg),
        }
    }
}

/// Embeds text as keyword occurrence counts, plus a constant bias dimension.
pub struct KeywordEmbedder {
    pub keywords: Vec<&'static str>,
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keywords"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                let mut v: Vec<f32> = self
                    .keywords
                    .iter()
                    .map(|k| lower.matches(*k).count() as f32)
                    .collect();
                v.push(0.1);
                v
            })
            .collect())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("embedding service unavailable")
    }
}

/// Prompt store backed by a map.
pub struct MapPromptStore(pub HashMap<String, String>);

#[async_trait]
impl PromptStore for MapPromptStore {
    async fn fetch(&self, name: &str) -> Result<String> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no prompt template named '{}'", name))
    }
}

pub fn test_config() -> Config {
    parse_config("[server]\nbind = \"127.0.0.1:0\"\n").unwrap()
}

/// Services over test doubles: a news page about football and economy.
pub fn test_services(completion: Arc<dyn CompletionClient>) -> Services {
    Services {
        completion,
        embedder: Arc::new(KeywordEmbedder {
            keywords: vec!["fútbol", "economía", "noticias"],
        }),
        loader: Arc::new(StaticPageLoader(Ok(NEWS_PAGE.to_string()))),
        prompts: Arc::new(BuiltinPromptStore::new()),
        personas: PersonaRegistry::builtin(),
        selector: Arc::new(SubstringSelector),
    }
}

pub const NEWS_PAGE: &str = "Noticias del día\n\n\
El equipo local de fútbol ganó la final de fútbol por dos goles.\n\n\
La economía creció un tres por ciento según el último informe de economía.";
