//! Language-model plumbing
//!
//! - Image URL validation
//! - Prompt construction
//! - Generation API client

pub mod openai;
pub mod prompt;
pub mod validate;

pub use openai::{ChatModel, OpenAiClient};
pub use prompt::{ContentPart, ImageRef, NOTHING_TO_EXPLAIN, Prompt, PromptPayload, build_prompt};
pub use validate::{is_valid_image_url, validate_image_urls};
