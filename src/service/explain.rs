//! Explanation generation
//!
//! Validates image URLs, builds the prompt and, unless there is nothing
//! to explain, makes exactly one model call. No retries.

use std::sync::Arc;

use crate::data::LanguageCode;
use crate::error::AppError;
use crate::llm::{ChatModel, NOTHING_TO_EXPLAIN, Prompt, build_prompt, validate_image_urls};
use crate::metrics::EXPLANATIONS_TOTAL;

/// Outcome of an explanation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    Generated(String),
    /// The cast had neither text nor images; the model was not called
    NothingToExplain,
}

impl Explanation {
    pub fn text(&self) -> &str {
        match self {
            Explanation::Generated(text) => text,
            Explanation::NothingToExplain => NOTHING_TO_EXPLAIN,
        }
    }
}

/// Produces explanations through a `ChatModel`
#[derive(Clone)]
pub struct Explainer {
    model: Arc<dyn ChatModel>,
}

impl Explainer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Explain a cast's text and images in `language`.
    ///
    /// Invalid image URLs are dropped; if none survive the request is
    /// text-only.
    pub async fn explain(
        &self,
        text: &str,
        images: Option<&[String]>,
        language: LanguageCode,
    ) -> Result<Explanation, AppError> {
        let images = images.and_then(validate_image_urls);

        let prompt = match build_prompt(text, images.as_deref(), language) {
            Prompt::NothingToExplain => {
                EXPLANATIONS_TOTAL
                    .with_label_values(&["nothing_to_explain"])
                    .inc();
                return Ok(Explanation::NothingToExplain);
            }
            Prompt::Ready(prompt) => prompt,
        };

        tracing::debug!(
            %language,
            images = prompt.image_count(),
            "Requesting explanation"
        );

        match self.model.complete(&prompt).await {
            Ok(text) => {
                EXPLANATIONS_TOTAL.with_label_values(&["generated"]).inc();
                Ok(Explanation::Generated(text))
            }
            Err(e) => {
                EXPLANATIONS_TOTAL.with_label_values(&["failed"]).inc();
                tracing::warn!(kind = e.kind(), "Explanation failed");
                Err(e)
            }
        }
    }
}
