//! Moderated multi-persona replies.
//!
//! A single classification call decides which personas should answer a
//! prompt; each selected persona then replies through [`crate::responder`].
//!
//! 1. Build the classification instruction (persona descriptors, fixed
//!    instruction, caller prompt).
//! 2. Ask the model, with a generic assistant system role.
//! 3. Let the configured [`ResponderSelector`] pick personas from the reply.
//! 4. Dispatch the selected personas with the context and the prompt as two
//!    user segments; results come back in registry order.
//!
//! A reply naming nobody yields an empty list. Any persona failure aborts
//! the whole request.
//!
//! [`ResponderSelector`]: tertulia_core::routing::ResponderSelector

use thiserror::Error;

use tertulia_core::models::{ChatMessage, PersonaResponse};
use tertulia_core::routing::classification_prompt;

use crate::completion::CompletionError;
use crate::config::ModeratorConfig;
use crate::responder::{respond_all, PersonaError};
use crate::services::Services;

/// System role of the classification call.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Error)]
pub enum ModeratorError {
    #[error("Provider error during classification: {0}")]
    ClassificationProvider(CompletionError),
    #[error("Unexpected error during classification: {0}")]
    Classification(CompletionError),
    #[error(transparent)]
    Persona(#[from] PersonaError),
}

/// Ask which personas should answer `prompt`, then collect their replies.
pub async fn moderated_responses(
    services: &Services,
    config: &ModeratorConfig,
    context_text: &str,
    prompt: &str,
) -> Result<Vec<PersonaResponse>, ModeratorError> {
    let personas = services.personas.all();
    let messages = [
        ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
        ChatMessage::user(classification_prompt(personas, prompt)),
    ];

    let decision = services
        .completion
        .complete(&messages)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "classification failed");
            if e.is_provider() {
                ModeratorError::ClassificationProvider(e)
            } else {
                ModeratorError::Classification(e)
            }
        })?;

    let selected: Vec<&str> = services
        .selector
        .select(&decision, personas)
        .iter()
        .map(|p| p.id)
        .collect();
    tracing::info!(?selected, "moderator selected personas");

    let responses = respond_all(
        services,
        &selected,
        context_text,
        Some(prompt),
        config.parallel,
    )
    .await?;
    Ok(responses)
}
