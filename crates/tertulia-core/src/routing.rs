//! Responder selection for the moderator.
//!
//! The moderator asks a completion model which personas should answer a
//! message and gets back free text. Interpreting that text is delegated to a
//! [`ResponderSelector`] so the matching strategy can be swapped (e.g. for
//! structured output parsing) without touching the moderator.
//!
//! The default [`SubstringSelector`] selects a persona whenever its
//! identifier appears anywhere in the reply, case-insensitively, regardless
//! of negation ("Mateo no debería
//! responder" still selects `mateo`).

use crate::persona::Persona;

/// Instruction appended after the persona descriptors in the classification prompt.
pub const CLASSIFICATION_INSTRUCTION: &str = "Teniendo en cuenta la personalidad de cada personaje, \
decide cuáles de ellos deberían responder al siguiente mensaje. Responde únicamente con los \
nombres de los personajes que deberían responder.";

/// Picks which personas should respond, given a classification reply.
pub trait ResponderSelector: Send + Sync {
    /// Return the selected personas, preserving the order of `personas`.
    fn select(&self, reply: &str, personas: &'static [Persona]) -> Vec<&'static Persona>;
}

/// Case-insensitive substring match on persona identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringSelector;

impl ResponderSelector for SubstringSelector {
    fn select(&self, reply: &str, personas: &'static [Persona]) -> Vec<&'static Persona> {
        let folded = reply.to_lowercase();
        personas
            .iter()
            .filter(|p| folded.contains(&p.id.to_lowercase()))
            .collect()
    }
}

/// Build the user content of the classification call.
///
/// One `"<id>: <descriptor>"` line per persona, then
/// [`CLASSIFICATION_INSTRUCTION`], then the caller's prompt verbatim.
pub fn classification_prompt(personas: &[Persona], prompt: &str) -> String {
    let mut out = String::new();
    for p in personas {
        out.push_str(p.id);
        out.push_str(": ");
        out.push_str(p.descriptor);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(CLASSIFICATION_INSTRUCTION);
    out.push_str("\n\nMensaje: ");
    out.push_str(prompt);
    out
}
