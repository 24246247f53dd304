//! Prompt construction
//!
//! Turns cast text, validated image URLs and a language into the
//! system persona plus ordered user content parts. The output depends
//! only on the inputs.

use serde::Serialize;

use crate::data::LanguageCode;

/// Returned instead of calling the model when there is nothing to explain
pub const NOTHING_TO_EXPLAIN: &str = "It looks like there isn't any text to explain! If you share a post with words or ideas, I can help make it simple and fun to understand. Just let me know!";

const PERSONA: &str = "You are an expert at explaining complex topics in simple terms. Your job is to take a social media post (which may include text, images, or memes) and explain it as if talking to a 5-year-old.

Rules:
- Use very simple words and short sentences
- Use analogies with things kids understand (toys, games, food, animals)
- Be friendly and fun, but don't be condescending
- Keep it concise (2-4 sentences max)
- If the post is already simple, just restate it in a friendly way
- If the post contains crypto/tech jargon, translate it to everyday concepts
- If there's a meme or joke in an image, explain what makes it funny
- Read and explain any text that appears in images
- Don't use emojis unless they add clarity
- Never say \"Explain like I'm 5\" or reference the ELI5 concept";

const IMAGES_ONLY_LEAD: &str = "Explain what's happening in the image(s) in simple terms. If there's text in an image, explain what it means:";

/// One part of the user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub url: String,
}

/// Persona plus content, ready to send. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    /// One leading text part, then one part per image
    pub parts: Vec<ContentPart>,
}

impl PromptPayload {
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, ContentPart::ImageUrl { .. }))
            .count()
    }
}

/// Result of prompt construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Neither text nor images: answer with `NOTHING_TO_EXPLAIN`
    NothingToExplain,
    Ready(PromptPayload),
}

/// Build the prompt for one generation call.
///
/// `Some(&[])` and `None` behave identically.
pub fn build_prompt(text: &str, images: Option<&[String]>, language: LanguageCode) -> Prompt {
    let images = images.unwrap_or_default();
    let has_text = !text.trim().is_empty();
    let has_images = !images.is_empty();

    let lead = match (has_text, has_images) {
        (false, false) => return Prompt::NothingToExplain,
        (true, true) => {
            format!("Explain this post and the image(s) in simple terms:\n\nPost text: \"{text}\"")
        }
        (true, false) => format!("Explain this post in simple terms:\n\n\"{text}\""),
        (false, true) => IMAGES_ONLY_LEAD.to_string(),
    };

    let mut parts = Vec::with_capacity(1 + images.len());
    parts.push(ContentPart::Text { text: lead });
    parts.extend(images.iter().map(|url| ContentPart::ImageUrl {
        image_url: ImageRef { url: url.clone() },
    }));

    Prompt::Ready(PromptPayload {
        system: system_prompt(language),
        parts,
    })
}

/// Fixed persona, plus a language directive for non-default languages
pub fn system_prompt(language: LanguageCode) -> String {
    if language.is_default() {
        PERSONA.to_string()
    } else {
        format!(
            "{PERSONA}\n- Respond ONLY in {name}. Do not use any {default}.",
            name = language.display_name(),
            default = LanguageCode::default().display_name()
        )
    }
}
