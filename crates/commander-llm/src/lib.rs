pub mod openai;
pub mod provider;

pub use openai::OpenAIProvider;
pub use provider::{Completion, CompletionProvider, LLMError, Result};
