use parley_openai::OpenAiError;

/// Result alias for conversation turns
pub type Result<T> = std::result::Result<T, ConversationError>;

/// Why a conversation turn failed
///
/// A failed turn leaves the transcript as it was before the turn started.
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    /// The completion backend failed or returned garbage
    #[error(transparent)]
    Backend(#[from] OpenAiError),

    /// The completion carried no assistant content
    #[error("completion returned no content")]
    EmptyResponse,

    /// The streaming task ended without reporting an outcome
    #[error("reply stream ended without an outcome")]
    Aborted,
}
