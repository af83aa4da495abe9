//! Persona replies.
//!
//! One completion call per persona, flavored by the persona's system prompt:
//!
//! ```text
//! system: <persona prompt>
//! user:   <context text>
//! user:   <extra prompt>      (optional)
//! ```
//!
//! Unknown personas fail before any call is made.

use futures::future::try_join_all;
use thiserror::Error;

use tertulia_core::models::{ChatMessage, PersonaResponse};
use tertulia_core::persona::{Persona, UnknownPersona};

use crate::completion::CompletionError;
use crate::services::Services;

/// Why a persona could not reply.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error(transparent)]
    UnknownPersona(#[from] UnknownPersona),
    /// The completion provider reported an error.
    #[error("Provider error for persona '{persona}': {cause}")]
    Provider {
        persona: String,
        cause: CompletionError,
    },
    /// Any other completion failure (transport, timeout, malformed reply).
    #[error("Unexpected error for persona '{persona}': {cause}")]
    Unexpected {
        persona: String,
        cause: CompletionError,
    },
}

impl PersonaError {
    fn from_completion(persona: &str, cause: CompletionError) -> Self {
        if cause.is_provider() {
            PersonaError::Provider {
                persona: persona.to_string(),
                cause,
            }
        } else {
            PersonaError::Unexpected {
                persona: persona.to_string(),
                cause,
            }
        }
    }
}

/// Message sequence for one persona reply.
pub fn persona_messages(persona: &Persona, context_text: &str, extra: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(persona.system_prompt),
        ChatMessage::user(context_text),
    ];
    if let Some(extra) = extra {
        messages.push(ChatMessage::user(extra));
    }
    messages
}

/// Generate one persona's reply to `context_text` (and `extra`, if given).
pub async fn respond(
    services: &Services,
    persona_id: &str,
    context_text: &str,
    extra: Option<&str>,
) -> Result<String, PersonaError> {
    let persona = services.personas.lookup(persona_id)?;
    let messages = persona_messages(persona, context_text, extra);

    match services.completion.complete(&messages).await {
        Ok(reply) => {
            tracing::debug!(
                persona = persona.id,
                chars = reply.chars().count(),
                "persona replied"
            );
            Ok(reply)
        }
        Err(cause) => {
            tracing::warn!(persona = persona.id, error = %cause, "persona completion failed");
            Err(PersonaError::from_completion(persona.id, cause))
        }
    }
}

/// Generate replies for several personas, in the order given.
///
/// All-or-nothing: the first failure discards every other reply. With
/// `parallel`, calls run concurrently but results keep the input order.
pub async fn respond_all(
    services: &Services,
    persona_ids: &[&str],
    context_text: &str,
    extra: Option<&str>,
    parallel: bool,
) -> Result<Vec<PersonaResponse>, PersonaError> {
    let reply_for = |id: &str| {
        let id = id.to_string();
        async move {
            let message = respond(services, &id, context_text, extra).await?;
            Ok::<_, PersonaError>(PersonaResponse { name: id, message })
        }
    };

    if parallel {
        return try_join_all(persona_ids.iter().map(|id| reply_for(id))).await;
    }

    let mut responses = Vec::with_capacity(persona_ids.len());
    for id in persona_ids {
        responses.push(reply_for(id).await?);
    }
    Ok(responses)
}
