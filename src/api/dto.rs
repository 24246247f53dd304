//! Session API request and response DTOs

use serde::{Deserialize, Serialize};

use crate::data::LanguageCode;

/// POST /api/session/submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub url: String,
}

/// POST /api/session/language
///
/// The code stays a string here so an unknown code is reported as a
/// validation error rather than a decoding failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

/// Entry of GET /api/languages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageResponse {
    pub code: LanguageCode,
    pub name: String,
}

impl From<LanguageCode> for LanguageResponse {
    fn from(language: LanguageCode) -> Self {
        Self {
            code: language,
            name: language.display_name().to_string(),
        }
    }
}
