//! Language-model access for clue authoring.
//!
//! [`LlmProvider`] is a single-turn chat completion seam; [`OpenAiProvider`]
//! implements it against any OpenAI-compatible `/chat/completions` endpoint.

pub mod openai;
pub mod types;

pub use openai::OpenAiProvider;
pub use types::{ChatRequest, ChatResponse, LlmError, LlmProvider};
