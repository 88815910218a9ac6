use async_trait::async_trait;
use commander_core::ChatMessage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Candidate answers returned for one completion request, in API order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub candidates: Vec<String>,
}

impl Completion {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// Text of the first candidate, unless there is none or it is empty.
    pub fn first(&self) -> Option<&str> {
        self.candidates
            .first()
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a chat completion
    ///
    /// # Arguments
    /// * `model` - Model name, taken from the conversation's root node
    /// * `messages` - Ordered context window, oldest first
    /// * `max_tokens` - Optional generation limit
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: Option<u32>,
    ) -> Result<Completion>;
}
