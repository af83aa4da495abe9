//! # Tertulia
//!
//! A small HTTP service that talks about the news through a panel of
//! personas.
//!
//! Tertulia answers a fixed question about any web page (retrieval-augmented
//! generation over a freshly indexed page) and produces short chat replies
//! from three characters, each with its own system prompt. A moderator step
//! can decide which characters should answer a given prompt.
//!
//! ## Architecture
//!
//! ```text
//! GET /rag/                     load → split → index → retrieve → prompt → chain → invoke
//! GET /character-responses/     responder (every persona)             → completion
//! GET /chat-completion/         responder (one persona)               → completion
//! GET /.../moderated/           moderator → responder (selected)      → completion
//! ```
//!
//! Pure logic (persona table, URL validation, chunking, the vector index,
//! routing) lives in `tertulia-core`; this crate wires it to HTTP
//! collaborators and serves it.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`completion`] | Chat-completion client |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`loader`] | Web page fetching and text extraction |
//! | [`prompt_store`] | RAG prompt templates |
//! | [`rag`] | Staged retrieval-augmented answer pipeline |
//! | [`responder`] | Persona replies |
//! | [`moderator`] | Classification-routed persona replies |
//! | [`services`] | Collaborator wiring |
//! | [`server`] | HTTP API |

pub mod completion;
pub mod config;
pub mod embedding;
pub mod loader;
pub mod moderator;
pub mod prompt_store;
pub mod rag;
pub mod responder;
pub mod server;
pub mod services;

#[cfg(test)]
mod testing;
