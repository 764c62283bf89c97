//! Inference transport implementations for Quill.
//!
//! All providers implement the `quill_core::Provider` trait. The only
//! production backend is a local Ollama server speaking NDJSON.

pub mod ndjson;
pub mod ollama;

pub use ndjson::NdjsonDecoder;
pub use ollama::OllamaProvider;
