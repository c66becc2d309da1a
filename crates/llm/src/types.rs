use async_trait::async_trait;

/// A single-turn chat request: one system message, one user message.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_completion_tokens: Option<u32>,
    /// Ask the model for a JSON object reply.
    pub json_response: bool,
    /// Reasoning effort hint for reasoning models (`"low"`, `"medium"`, ...).
    pub reasoning_effort: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ChatResponse {
    /// Content of the first choice; empty when the model returned none.
    pub text: String,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError>;
}
