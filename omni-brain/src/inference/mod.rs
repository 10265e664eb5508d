//! Clients for the local inference runtimes
//!
//! The language and embedding models are opaque functions behind an
//! OpenAI-compatible HTTP surface served by the local llama.cpp runtimes.
//! Nothing in here knows about prompts or intents; higher layers own those.

pub mod completion;
pub mod embedding;

pub use completion::{CompletionClient, GenerationOptions};
pub use embedding::{Embedder, EmbeddingClient};

use thiserror::Error;

/// Inference transport/protocol errors.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference client build failed: {0}")]
    Build(String),
    #[error("inference request failed: {0}")]
    Request(String),
    #[error("inference runtime returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed inference response: {0}")]
    Malformed(String),
}
