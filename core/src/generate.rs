//! Generation operations for blog content.
//!
//! This module centralises the four AI-assisted transformations (summary,
//! SEO metadata, tag suggestions, content enhancement). Each operation
//! validates its input, builds a task-specific prompt, runs it through the
//! fallback runner, and applies light post-processing to the raw model
//! output. Validation and availability checks always run before any network
//! call is made.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::config::{ProviderConfig, ProviderFamily};
use crate::errors::GenerateError;
use crate::providers::{run_with_fallback, HfClient, ModelCandidates, OpenAiClient, TextGenerator};

const MIN_SUMMARY_INPUT_CHARS: usize = 20;
const SUMMARY_CHAR_CAP: usize = 150;
const SUMMARY_SENTENCE_CAP: usize = 2;
const META_DESCRIPTION_CHAR_CAP: usize = 160;
const MAX_SEO_KEYWORDS: usize = 8;
const MAX_TAGS: usize = 5;
const SEO_CONTENT_CLIP: usize = 500;
const TAGS_CONTENT_CLIP: usize = 300;
const OPENAI_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// The task a generation request belongs to. Drives candidate selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Summary,
    SeoContent,
    Enhancement,
    Tags,
}

/// Shaped output of the summary operation.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutput {
    pub summary: String,
}

/// Shaped output of the SEO operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOutput {
    pub meta_description: String,
    pub seo_keywords: String,
}

/// Shaped output of the enhancement operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceOutput {
    pub enhanced_content: String,
}

/// Shaped output of the tag suggestion operation.
#[derive(Debug, Clone, Serialize)]
pub struct TagsOutput {
    pub tags: String,
}

/// Primary entry point for the generation pipeline. Owns the immutable
/// provider selection and the active backend client.
pub struct GenerationEngine {
    family: ProviderFamily,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl GenerationEngine {
    /// Build the engine for the configured provider family. When no
    /// credential is present the engine still constructs, but every
    /// operation fails fast with `ServiceUnavailable`.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let generator: Option<Arc<dyn TextGenerator>> = match config.active_family() {
            ProviderFamily::HuggingFace => {
                let key = config
                    .huggingface_api_key()
                    .ok_or_else(|| anyhow!("Hugging Face family selected without a credential"))?;
                Some(Arc::new(HfClient::new(key, config.huggingface_base_url())?))
            }
            ProviderFamily::OpenAi => {
                let key = config
                    .openai_api_key()
                    .ok_or_else(|| anyhow!("OpenAI family selected without a credential"))?;
                Some(Arc::new(OpenAiClient::new(key, config.openai_base_url())?))
            }
            ProviderFamily::None => None,
        };
        Ok(Self {
            family: config.active_family(),
            generator,
        })
    }

    /// Build the engine around a custom backend.
    pub fn with_generator(family: ProviderFamily, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            family,
            generator: Some(generator),
        }
    }

    pub fn active_family(&self) -> ProviderFamily {
        self.family
    }

    /// Summarise blog content into at most two sentences capped at 150
    /// characters.
    pub async fn generate_summary(&self, content: &str) -> Result<SummaryOutput, GenerateError> {
        require("content", content)?;
        if content.trim().chars().count() < MIN_SUMMARY_INPUT_CHARS {
            return Err(GenerateError::InputTooShort);
        }
        let raw = self.run(TaskKind::Summary, &summary_prompt(content)).await?;
        Ok(SummaryOutput {
            summary: condense_summary(&raw),
        })
    }

    /// Produce a meta description and keyword list for a post. Labels the
    /// model fails to emit are synthesised locally without another network
    /// round trip.
    pub async fn generate_seo(&self, title: &str, content: &str) -> Result<SeoOutput, GenerateError> {
        require("title", title)?;
        require("content", content)?;
        let raw = self
            .run(TaskKind::SeoContent, &seo_prompt(title, content))
            .await?;
        let (meta, keywords) = parse_seo_labels(&raw);
        Ok(SeoOutput {
            meta_description: meta.unwrap_or_else(|| fallback_meta_description(title)),
            seo_keywords: keywords.unwrap_or_else(|| fallback_seo_keywords(title, content)),
        })
    }

    /// Rewrite the content with appended "Key Takeaways" and "Conclusion"
    /// sections. The model's full output is returned, not a diff.
    pub async fn enhance_content(&self, content: &str) -> Result<EnhanceOutput, GenerateError> {
        require("content", content)?;
        let raw = self
            .run(TaskKind::Enhancement, &enhance_prompt(content))
            .await?;
        Ok(EnhanceOutput {
            enhanced_content: raw,
        })
    }

    /// Suggest up to five comma-separated tags. A supplied category is
    /// prepended when the model did not already include it.
    pub async fn generate_tags(
        &self,
        title: &str,
        content: &str,
        category: Option<&str>,
    ) -> Result<TagsOutput, GenerateError> {
        require("title", title)?;
        require("content", content)?;
        let raw = self.run(TaskKind::Tags, &tags_prompt(title, content)).await?;
        Ok(TagsOutput {
            tags: finalize_tags(&raw, category),
        })
    }

    async fn run(&self, task: TaskKind, prompt: &str) -> Result<String, GenerateError> {
        let generator = self
            .generator
            .as_ref()
            .filter(|_| self.family != ProviderFamily::None)
            .ok_or(GenerateError::ServiceUnavailable)?;
        let candidates = self.candidates(task);
        run_with_fallback(generator.as_ref(), &candidates, prompt).await
    }

    fn candidates(&self, task: TaskKind) -> ModelCandidates {
        if self.family == ProviderFamily::OpenAi {
            return ModelCandidates::single(OPENAI_CHAT_MODEL);
        }
        match task {
            TaskKind::Summary => ModelCandidates::new(
                "facebook/bart-large-cnn",
                &["sshleifer/distilbart-cnn-12-6", "facebook/bart-base"],
            ),
            TaskKind::SeoContent | TaskKind::Enhancement | TaskKind::Tags => ModelCandidates::new(
                "sshleifer/distilbart-cnn-12-6",
                &["facebook/bart-base", "facebook/bart-large-cnn"],
            ),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), GenerateError> {
    if value.trim().is_empty() {
        Err(GenerateError::InputMissing(field))
    } else {
        Ok(())
    }
}

fn summary_prompt(content: &str) -> String {
    format!("Summarize the following text in 2-3 sentences: {content}")
}

fn seo_prompt(title: &str, content: &str) -> String {
    format!(
        "Generate SEO content for this blog post:\n\
         Title: {title}\n\
         Content: {}\n\n\
         Provide:\n\
         1. Meta Description (max 160 characters)\n\
         2. SEO Keywords (8 keywords, comma-separated)\n\n\
         Format:\n\
         Meta Description: [description]\n\
         SEO Keywords: [keywords]",
        clip(content, SEO_CONTENT_CLIP)
    )
}

fn tags_prompt(title: &str, content: &str) -> String {
    format!(
        "Suggest 5 relevant tags for this blog post:\n\
         Title: {title}\n\
         Content: {}\n\n\
         Tags (comma-separated):",
        clip(content, TAGS_CONTENT_CLIP)
    )
}

fn enhance_prompt(content: &str) -> String {
    format!(
        "Rewrite and enhance the following blog content. Keep the author's \
         voice and structure, then append a \"Key Takeaways\" bullet list and \
         a \"Conclusion\" section:\n\n{content}"
    )
}

/// Condense raw model output to at most two sentences and 150 characters.
///
/// The two-sentence cap applies even when a third sentence would fit under
/// the character limit. That mirrors the observed behaviour of the original
/// post-processing; see DESIGN.md before changing it.
fn condense_summary(raw: &str) -> String {
    let text = raw.trim();
    let sentences: Vec<&str> = text
        .split('.')
        .filter(|s| !s.trim().is_empty())
        .take(SUMMARY_SENTENCE_CAP)
        .collect();
    let condensed = format!("{}.", sentences.join("."));
    if condensed.chars().count() > SUMMARY_CHAR_CAP {
        let clipped: String = condensed.chars().take(SUMMARY_CHAR_CAP - 3).collect();
        format!("{clipped}...")
    } else {
        condensed
    }
}

/// Scan output lines case-insensitively for the `Meta Description:` and
/// `SEO Keywords:` labels, returning whatever follows the first colon.
/// Label order in the raw text is irrelevant.
fn parse_seo_labels(raw: &str) -> (Option<String>, Option<String>) {
    let mut meta = None;
    let mut keywords = None;
    for line in raw.lines() {
        let lower = line.trim_start().to_lowercase();
        if lower.starts_with("meta description") {
            if meta.is_none() {
                meta = after_colon(line);
            }
        } else if lower.starts_with("seo keywords") {
            if keywords.is_none() {
                keywords = after_colon(line);
            }
        }
    }
    (meta, keywords)
}

fn after_colon(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, rest)| rest.trim().to_string())
        .filter(|rest| !rest.is_empty())
}

/// Deterministic local meta description, used when the model omits the
/// label. This is the documented safety net, not dead code.
fn fallback_meta_description(title: &str) -> String {
    let description = format!(
        "Discover {} and learn more about this fascinating topic. Read our \
         comprehensive guide with expert insights and practical tips.",
        title.to_lowercase()
    );
    clip(&description, META_DESCRIPTION_CHAR_CAP)
}

/// Deterministic local keyword list: title words longer than three letters
/// plus the content's most frequent 4+-letter words, capped at eight and
/// suffixed with generic blog keywords.
fn fallback_seo_keywords(title: &str, content: &str) -> String {
    let mut keywords: Vec<String> = Vec::new();
    for word in title.to_lowercase().split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if cleaned.chars().count() > 3 && !keywords.contains(&cleaned) {
            keywords.push(cleaned);
        }
    }
    for word in frequent_words(content) {
        if keywords.len() >= MAX_SEO_KEYWORDS {
            break;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords.truncate(MAX_SEO_KEYWORDS);
    if keywords.is_empty() {
        "blog, guide, tips".to_string()
    } else {
        format!("{}, blog, guide, tips", keywords.join(", "))
    }
}

/// 4+-letter words of the content ranked by frequency, ties broken by first
/// appearance so the result is deterministic.
fn frequent_words(content: &str) -> Vec<String> {
    let lowered = content.to_lowercase();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for word in lowered.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() < 4 {
            continue;
        }
        if !counts.contains_key(word) {
            order.push(word);
        }
        *counts.entry(word).or_insert(0) += 1;
    }
    // sort_by is stable, so equal counts keep first-seen order
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().map(str::to_string).collect()
}

/// Split raw tag output on commas, prepend the category when absent, and cap
/// the list at five entries.
fn finalize_tags(raw: &str, category: Option<&str>) -> String {
    let mut tags: Vec<String> = raw
        .split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    if let Some(category) = category {
        let category = category.trim();
        if !category.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(category)) {
            tags.insert(0, category.to_lowercase());
        }
    }
    tags.truncate(MAX_TAGS);
    tags.join(", ")
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
