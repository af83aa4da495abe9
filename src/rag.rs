//! Retrieval-augmented answers over a single web page.
//!
//! Every `/rag/` request runs the same fixed question against a freshly
//! indexed page. The work is a straight pipeline of named stages; the first
//! failure aborts the request and is reported with its [`Stage`].
//!
//! ```text
//! load → split → index → retrieve → prompt → chain → invoke
//! ```
//!
//! Nothing is cached: the page is fetched, chunked, and embedded again on
//! every call.

use minijinja::{context, Environment};
use thiserror::Error;
use url::Url;

use tertulia_core::chunk::chunk_text;
use tertulia_core::models::ChatMessage;
use tertulia_core::store::memory::InMemoryIndex;
use tertulia_core::store::VectorIndex;

use crate::config::Config;
use crate::embedding::embed_query;
use crate::services::Services;

/// A named step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Split,
    Index,
    Retrieve,
    PromptFetch,
    ChainAssembly,
    Invoke,
}

impl Stage {
    /// Machine-readable label, used in error codes (`<label>_failed`).
    pub fn label(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Split => "split",
            Stage::Index => "index",
            Stage::Retrieve => "retrieve",
            Stage::PromptFetch => "prompt",
            Stage::ChainAssembly => "chain",
            Stage::Invoke => "invoke",
        }
    }

    fn activity(self) -> &'static str {
        match self {
            Stage::Load => "loading the web page",
            Stage::Split => "splitting the page text",
            Stage::Index => "indexing the page",
            Stage::Retrieve => "retrieving relevant passages",
            Stage::PromptFetch => "fetching the prompt template",
            Stage::ChainAssembly => "assembling the prompt",
            Stage::Invoke => "invoking the language model",
        }
    }
}

/// A pipeline failure tagged with the stage that raised it.
#[derive(Debug, Error)]
#[error("Error {}: {:#}", .stage.activity(), .cause)]
pub struct StageError {
    pub stage: Stage,
    cause: anyhow::Error,
}

impl StageError {
    pub fn new(stage: Stage, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}

/// Tags a fallible step with its [`Stage`].
trait AtStage<T> {
    fn at_stage(self, stage: Stage) -> Result<T, StageError>;
}

impl<T, E: Into<anyhow::Error>> AtStage<T> for Result<T, E> {
    fn at_stage(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|e| StageError::new(stage, e))
    }
}

/// Answer the configured question about the page at `url`.
pub async fn answer_from_page(
    config: &Config,
    services: &Services,
    url: &Url,
) -> Result<String, StageError> {
    let question = &config.rag.question;

    let text = services.loader.load(url).await.at_stage(Stage::Load)?;
    tracing::info!(%url, chars = text.chars().count(), "page loaded");

    let chunks = chunk_text(
        &text,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
    );
    if chunks.is_empty() {
        return Err(StageError::new(
            Stage::Split,
            anyhow::anyhow!("page has no paragraph or heading text"),
        ));
    }
    tracing::debug!(chunks = chunks.len(), "page split");

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = services.embedder.embed(&texts).await.at_stage(Stage::Index)?;
    let index = InMemoryIndex::from_embeddings(chunks, vectors).at_stage(Stage::Index)?;

    let query = embed_query(services.embedder.as_ref(), question)
        .await
        .at_stage(Stage::Retrieve)?;
    let hits = index.top_k(&query, config.retrieval.top_k);
    tracing::debug!(
        hits = hits.len(),
        best = hits.first().map(|h| h.score).unwrap_or(0.0),
        "passages retrieved"
    );

    let template = services
        .prompts
        .fetch(&config.rag.prompt_name)
        .await
        .at_stage(Stage::PromptFetch)?;

    let context_text = hits
        .iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let prompt = render_prompt(&template, question, &context_text).at_stage(Stage::ChainAssembly)?;

    let answer = services
        .completion
        .complete(&[ChatMessage::user(prompt)])
        .await
        .at_stage(Stage::Invoke)?;

    tracing::info!(%url, "answer generated");
    Ok(answer)
}

fn render_prompt(template: &str, question: &str, context_text: &str) -> Result<String, minijinja::Error> {
    let env = Environment::new();
    env.render_str(template, context! { question => question, context => context_text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::completion::CompletionError;
    use crate::embedding::DisabledEmbedder;
    use crate::testing::{
        last_user, test_config, test_services, FailingEmbedder, MapPromptStore,
        ScriptedCompletion, StaticPageLoader,
    };

    fn url() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    fn config_with_question(question: &str) -> Config {
        let mut config = test_config();
        config.rag.question = question.to_string();
        config.retrieval.top_k = 1;
        config.chunking.chunk_size = 80;
        config.chunking.chunk_overlap = 0;
        config
    }

    #[tokio::test]
    async fn test_answer_uses_most_relevant_passage() {
        let completion = ScriptedCompletion::new(|_| Ok("La economía creció.".to_string()));
        let services = test_services(completion.clone());
        let config = config_with_question("¿Qué pasó con la economía?");

        let answer = answer_from_page(&config, &services, &url()).await.unwrap();
        assert_eq!(answer, "La economía creció.");

        let calls = completion.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        let prompt = last_user(&calls[0]);
        assert!(prompt.contains("Question: ¿Qué pasó con la economía?"));
        assert!(prompt.contains("La economía creció un tres por ciento"));
        assert!(!prompt.contains("fútbol"));
    }

    #[tokio::test]
    async fn test_load_failure() {
        let completion = ScriptedCompletion::new(|_| Ok(String::new()));
        let mut services = test_services(completion.clone());
        services.loader = Arc::new(StaticPageLoader(Err("connection refused".to_string())));

        let err = answer_from_page(&test_config(), &services, &url())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Load);
        assert_eq!(err.to_string(), "Error loading the web page: connection refused");
        assert!(completion.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_fails_at_split() {
        let mut services = test_services(ScriptedCompletion::new(|_| Ok(String::new())));
        services.loader = Arc::new(StaticPageLoader(Ok("   ".to_string())));

        let err = answer_from_page(&test_config(), &services, &url())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Split);
        assert_eq!(err.stage.label(), "split");
    }

    #[tokio::test]
    async fn test_embedding_failure_fails_at_index() {
        let mut services = test_services(ScriptedCompletion::new(|_| Ok(String::new())));
        services.embedder = Arc::new(FailingEmbedder);

        let err = answer_from_page(&test_config(), &services, &url())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Index);
        assert!(err.to_string().contains("embedding service unavailable"));
    }

    #[tokio::test]
    async fn test_disabled_embedder_fails_at_index() {
        let mut services = test_services(ScriptedCompletion::new(|_| Ok(String::new())));
        services.embedder = Arc::new(DisabledEmbedder);

        let err = answer_from_page(&test_config(), &services, &url())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Index);
    }

    #[tokio::test]
    async fn test_missing_template_fails_at_prompt_fetch() {
        let mut services = test_services(ScriptedCompletion::new(|_| Ok(String::new())));
        services.prompts = Arc::new(MapPromptStore(HashMap::new()));

        let err = answer_from_page(&test_config(), &services, &url())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::PromptFetch);
        assert_eq!(err.stage.label(), "prompt");
    }

    #[tokio::test]
    async fn test_broken_template_fails_at_chain_assembly() {
        let mut services = test_services(ScriptedCompletion::new(|_| Ok(String::new())));
        let mut templates = HashMap::new();
        templates.insert("rag-prompt".to_string(), "{{ question ".to_string());
        services.prompts = Arc::new(MapPromptStore(templates));

        let err = answer_from_page(&test_config(), &services, &url())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::ChainAssembly);
    }

    #[tokio::test]
    async fn test_completion_failure_fails_at_invoke() {
        let completion = ScriptedCompletion::new(|_| {
            Err(CompletionError::Provider {
                status: 429,
                message: "rate limited".to_string(),
            })
        });
        let services = test_services(completion.clone());

        let err = answer_from_page(&test_config(), &services, &url())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Invoke);
        assert_eq!(
            err.to_string(),
            "Error invoking the language model: API error 429: rate limited"
        );
        assert_eq!(completion.calls().len(), 1);
    }

    #[test]
    fn test_render_prompt() {
        let rendered = render_prompt("Q: {{ question }} | C: {{ context }}", "¿qué?", "uno\n\ndos").unwrap();
        assert_eq!(rendered, "Q: ¿qué? | C: uno\n\ndos");
    }
}
