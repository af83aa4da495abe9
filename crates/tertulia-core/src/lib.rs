//! # Tertulia Core
//!
//! Shared, WASM-safe logic for Tertulia: data models, the persona registry,
//! URL validation, text chunking, the in-memory vector index, and responder
//! selection for the moderator.
//!
//! This crate contains no tokio, HTTP clients, or filesystem I/O. Everything
//! that talks to the outside world lives in the `tertulia` app crate.

pub mod chunk;
pub mod embedding;
pub mod models;
pub mod persona;
pub mod routing;
pub mod store;
pub mod validate;
