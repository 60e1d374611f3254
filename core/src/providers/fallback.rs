//! Sequential trial of candidate models with first-success short circuit.
//!
//! Candidates are always attempted in declared order and never in parallel:
//! the first usable result must come from the most-preferred model that is
//! actually serving. Per-candidate failures are absorbed here; only the
//! terminal outcome crosses the module boundary.

use crate::errors::GenerateError;

use super::client::{ProviderError, TextGenerator};

/// Ordered candidate models for one task. The head is the preferred model,
/// the tail holds fallbacks in declared order; the list is never empty.
#[derive(Debug, Clone)]
pub struct ModelCandidates {
    primary: String,
    fallbacks: Vec<String>,
}

impl ModelCandidates {
    pub fn new(primary: impl Into<String>, fallbacks: &[&str]) -> Self {
        Self {
            primary: primary.into(),
            fallbacks: fallbacks.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn single(model: impl Into<String>) -> Self {
        Self::new(model, &[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// Tagged outcome of one candidate attempt.
enum Attempt {
    Success(String),
    Loading,
    Empty,
    Failed(String),
}

/// Run the prompt against each candidate in order and return the first
/// non-blank output. A still-loading model is skipped without counting as a
/// terminal failure; empty output and provider errors are soft until the
/// list is exhausted.
pub async fn run_with_fallback(
    generator: &dyn TextGenerator,
    candidates: &ModelCandidates,
    prompt: &str,
) -> Result<String, GenerateError> {
    let mut last_err: Option<String> = None;

    for model in candidates.iter() {
        match attempt(generator, model, prompt).await {
            Attempt::Success(text) => {
                tracing::info!(
                    code = "AI-0200",
                    model,
                    preview = %preview(&text),
                    "model invocation succeeded"
                );
                return Ok(text);
            }
            Attempt::Loading => {
                tracing::debug!(model, "model is loading, trying next candidate");
            }
            Attempt::Empty => {
                tracing::warn!(code = "AI-0201", model, "model returned empty output");
            }
            Attempt::Failed(message) => {
                tracing::warn!(
                    code = "AI-0201",
                    model,
                    error = %message,
                    "model invocation failed"
                );
                last_err = Some(message);
            }
        }
    }

    Err(GenerateError::AllModelsFailed(last_err.unwrap_or_else(
        || "no candidate model produced usable output".to_string(),
    )))
}

async fn attempt(generator: &dyn TextGenerator, model: &str, prompt: &str) -> Attempt {
    match generator.generate(model, prompt).await {
        Ok(text) if !text.trim().is_empty() => Attempt::Success(text),
        Ok(_) => Attempt::Empty,
        Err(ProviderError::ModelLoading(_)) => Attempt::Loading,
        Err(ProviderError::EmptyOutput) => Attempt::Empty,
        Err(err) => Attempt::Failed(err.to_string()),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Generator that replays a fixed script and records every invocation.
    struct Scripted {
        outcomes: Mutex<VecDeque<Result<String, ProviderError>>>,
        calls: AtomicUsize,
        models: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
                models: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, model: &str, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.models.lock().unwrap().push(model.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("generator invoked more times than scripted")
        }
    }

    fn candidates() -> ModelCandidates {
        ModelCandidates::new("model-a", &["model-b", "model-c", "model-d"])
    }

    #[tokio::test]
    async fn skips_loading_models_and_stops_at_first_success() {
        let generator = Scripted::new(vec![
            Err(ProviderError::ModelLoading("model-a".into())),
            Err(ProviderError::ModelLoading("model-b".into())),
            Ok("third time lucky".into()),
        ]);
        let result = run_with_fallback(&generator, &candidates(), "prompt")
            .await
            .unwrap();
        assert_eq!(result, "third time lucky");
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let generator = Scripted::new(vec![Ok("immediate".into())]);
        let result = run_with_fallback(&generator, &candidates(), "prompt")
            .await
            .unwrap();
        assert_eq!(result, "immediate");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn candidates_are_tried_in_declared_order() {
        let generator = Scripted::new(vec![
            Err(ProviderError::EmptyOutput),
            Err(ProviderError::EmptyOutput),
            Err(ProviderError::EmptyOutput),
            Ok("last".into()),
        ]);
        run_with_fallback(&generator, &candidates(), "prompt")
            .await
            .unwrap();
        assert_eq!(
            *generator.models.lock().unwrap(),
            vec!["model-a", "model-b", "model-c", "model-d"]
        );
    }

    #[tokio::test]
    async fn exhaustion_carries_the_last_underlying_error() {
        let generator = Scripted::new(vec![
            Err(ProviderError::Upstream {
                status: 500,
                body: "first failure".into(),
            }),
            Err(ProviderError::EmptyOutput),
            Err(ProviderError::ModelLoading("model-c".into())),
            Err(ProviderError::Upstream {
                status: 502,
                body: "final failure".into(),
            }),
        ]);
        let err = run_with_fallback(&generator, &candidates(), "prompt")
            .await
            .unwrap_err();
        match err {
            GenerateError::AllModelsFailed(message) => assert!(message.contains("final failure")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(generator.calls(), 4);
    }

    #[tokio::test]
    async fn all_blank_outputs_surface_all_models_failed() {
        let generator = Scripted::new(vec![
            Ok("   ".into()),
            Err(ProviderError::EmptyOutput),
            Ok(String::new()),
            Err(ProviderError::EmptyOutput),
        ]);
        let err = run_with_fallback(&generator, &candidates(), "prompt")
            .await
            .unwrap_err();
        match err {
            GenerateError::AllModelsFailed(message) => {
                assert!(message.contains("no candidate model produced usable output"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
