use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("No conversation id specified to get context tree")]
    MissingConversationId,

    #[error("Context node content must not be empty")]
    EmptyContent,
}

pub type Result<T> = std::result::Result<T, ContextError>;
