pub mod client;
pub mod fallback;

pub use client::{HfClient, OpenAiClient, ProviderError, TextGenerator};
pub use fallback::{run_with_fallback, ModelCandidates};
