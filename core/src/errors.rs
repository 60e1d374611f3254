use thiserror::Error;

/// Terminal outcomes of a generation operation, mapped to HTTP responses by
/// the API layer.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0} is required")]
    InputMissing(&'static str),
    #[error("Content is too short for summarization.")]
    InputTooShort,
    #[error("AI service is not available. No provider credential is configured.")]
    ServiceUnavailable,
    #[error("All models failed: {0}")]
    AllModelsFailed(String),
}

impl GenerateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputMissing(_) => "AI-0400",
            Self::InputTooShort => "AI-0401",
            Self::ServiceUnavailable => "AI-0503",
            Self::AllModelsFailed(_) => "AI-0500",
        }
    }

    pub fn explain(&self) -> &'static str {
        match self {
            Self::InputMissing(_) => "A required request field was empty or absent.",
            Self::InputTooShort => "The content did not meet the minimum length for this operation.",
            Self::ServiceUnavailable => {
                "Neither HUGGINGFACE_API_KEY nor OPENAI_API_KEY is set for this process."
            }
            Self::AllModelsFailed(_) => "Every candidate model was tried and none produced output.",
        }
    }
}
