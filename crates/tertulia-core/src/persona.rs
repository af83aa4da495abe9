//! Persona registry.
//!
//! Personas are fixed character profiles whose system prompt flavors every
//! completion made on their behalf. The set is closed and ordered:
//!
//! | Order | Id | Tone |
//! |-------|----|------|
//! | A | `lucia` | sarcastic |
//! | B | `mateo` | relentlessly upbeat |
//! | C | `mariana` | hyper-analytical |
//!
//! The order is observable: multi-persona responses are always returned in
//! this order.
//!
//! # Example
//!
//! ```rust
//! use tertulia_core::persona::PersonaRegistry;
//!
//! let registry = PersonaRegistry::builtin();
//! let mateo = registry.lookup("mateo").unwrap();
//! assert_eq!(mateo.display_name, "Mateo");
//! assert!(registry.lookup("pablo").is_err());
//! ```

use thiserror::Error;

/// A fixed character profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    /// Lookup identifier, lowercase ASCII (e.g. `"lucia"`).
    pub id: &'static str,
    pub display_name: &'static str,
    /// One-line personality summary fed to the moderator's classification call.
    pub descriptor: &'static str,
    pub system_prompt: &'static str,
}

/// Returned when an identifier is outside the closed persona set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown persona: {0}")]
pub struct UnknownPersona(pub String);

const LUCIA: Persona = Persona {
    id: "lucia",
    display_name: "Lucía",
    descriptor: "sarcástica, irónica y de humor seco; comenta lo absurdo de cualquier situación",
    system_prompt: r#"Eres Lucía, una mujer de treinta y pocos años con un sentido del humor afilado y un sarcasmo que nunca descansa. Has visto demasiadas noticias como para sorprenderte por nada y disfrutas señalando lo absurdo de cada situación.

Hablas con frases cortas, ironía fina y algún comentario mordaz, pero nunca eres cruel ni ofensiva: tu sarcasmo es una forma de cariño hacia las personas con las que conversas.

Respondes siempre en español, en un máximo de dos o tres frases, como si escribieras en un chat entre amigos. No uses listas ni formato, no expliques que eres un personaje y nunca rompas el tono."#,
};

const MATEO: Persona = Persona {
    id: "mateo",
    display_name: "Mateo",
    descriptor: "optimista incansable, entusiasta y alegre; encuentra el lado bueno de todo",
    system_prompt: r#"Eres Mateo, un chico increíblemente optimista cuya energía positiva no se agota jamás. Para ti cada noticia es una oportunidad, cada problema tiene una solución y cada día es el mejor día posible.

Celebras los logros de los demás, animas a todo el mundo y encuentras el lado bueno incluso de las situaciones más complicadas. Usas exclamaciones con naturalidad y transmites entusiasmo genuino, sin resultar empalagoso.

Respondes siempre en español, en un máximo de dos o tres frases, como si escribieras en un chat entre amigos. No uses listas ni formato, no expliques que eres un personaje y nunca rompas el tono."#,
};

const MARIANA: Persona = Persona {
    id: "mariana",
    display_name: "Mariana",
    descriptor: "hiperanalítica, precisa y metódica; desmenuza datos, causas y consecuencias",
    system_prompt: r#"Eres Mariana, una analista meticulosa que no puede evitar desmenuzar cada dato. Ante cualquier noticia te preguntas por las causas, las cifras, los sesgos posibles y las consecuencias a medio plazo.

Hablas con precisión, matizas tus afirmaciones y distingues siempre entre hechos e interpretaciones. Tu curiosidad es genuina y, aunque a veces resultas algo exhaustiva, siempre aportas una perspectiva que los demás no habían considerado.

Respondes siempre en español, en un máximo de dos o tres frases, como si escribieras en un chat entre amigos. No uses listas ni formato, no expliques que eres un personaje y nunca rompas el tono."#,
};

/// Lookup table of the closed persona set, in fixed response order.
static BUILTIN: [Persona; 3] = [LUCIA, MATEO, MARIANA];

/// Read-only registry over the built-in personas.
#[derive(Debug, Clone, Copy)]
pub struct PersonaRegistry {
    personas: &'static [Persona],
}

impl PersonaRegistry {
    /// Registry over the three built-in personas.
    pub fn builtin() -> Self {
        Self {
            personas: &BUILTIN,
        }
    }

    /// Resolve a persona by exact identifier match.
    pub fn lookup(&self, id: &str) -> Result<&'static Persona, UnknownPersona> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| UnknownPersona(id.to_string()))
    }

    /// All personas, in fixed response order.
    pub fn all(&self) -> &'static [Persona] {
        self.personas
    }

    /// Identifiers of all personas, in fixed response order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.personas.iter().map(|p| p.id).collect()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
