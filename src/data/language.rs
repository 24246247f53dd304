//! Supported explanation languages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Language an explanation is written in
///
/// The set is closed: anything outside it is rejected at the HTTP
/// boundary, so the prompt builder only ever sees a known code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Es,
    Fr,
    De,
    Pt,
    It,
    Nl,
    Ja,
    Ko,
    Zh,
    Ru,
    Ar,
    Hi,
    Tr,
    Pl,
}

impl LanguageCode {
    /// Every supported language, in selector order
    pub const ALL: [LanguageCode; 15] = [
        LanguageCode::En,
        LanguageCode::Es,
        LanguageCode::Fr,
        LanguageCode::De,
        LanguageCode::Pt,
        LanguageCode::It,
        LanguageCode::Nl,
        LanguageCode::Ja,
        LanguageCode::Ko,
        LanguageCode::Zh,
        LanguageCode::Ru,
        LanguageCode::Ar,
        LanguageCode::Hi,
        LanguageCode::Tr,
        LanguageCode::Pl,
    ];

    pub fn code(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
            LanguageCode::De => "de",
            LanguageCode::Pt => "pt",
            LanguageCode::It => "it",
            LanguageCode::Nl => "nl",
            LanguageCode::Ja => "ja",
            LanguageCode::Ko => "ko",
            LanguageCode::Zh => "zh",
            LanguageCode::Ru => "ru",
            LanguageCode::Ar => "ar",
            LanguageCode::Hi => "hi",
            LanguageCode::Tr => "tr",
            LanguageCode::Pl => "pl",
        }
    }

    /// Canonical English name, used in the prompt's language directive
    pub fn display_name(self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Es => "Spanish",
            LanguageCode::Fr => "French",
            LanguageCode::De => "German",
            LanguageCode::Pt => "Portuguese",
            LanguageCode::It => "Italian",
            LanguageCode::Nl => "Dutch",
            LanguageCode::Ja => "Japanese",
            LanguageCode::Ko => "Korean",
            LanguageCode::Zh => "Chinese",
            LanguageCode::Ru => "Russian",
            LanguageCode::Ar => "Arabic",
            LanguageCode::Hi => "Hindi",
            LanguageCode::Tr => "Turkish",
            LanguageCode::Pl => "Polish",
        }
    }

    pub fn is_default(self) -> bool {
        self == LanguageCode::default()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LanguageCode::ALL
            .into_iter()
            .find(|language| language.code() == wanted)
            .ok_or_else(|| AppError::Validation(format!("Unsupported language: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_languages_with_english_default() {
        assert_eq!(LanguageCode::ALL.len(), 15);
        assert_eq!(LanguageCode::default(), LanguageCode::En);
        assert!(LanguageCode::En.is_default());
        assert!(!LanguageCode::Ja.is_default());
    }

    #[test]
    fn parses_known_codes() {
        assert_eq!("es".parse::<LanguageCode>().unwrap(), LanguageCode::Es);
        assert_eq!(" ZH ".parse::<LanguageCode>().unwrap(), LanguageCode::Zh);
        assert_eq!(LanguageCode::Zh.display_name(), "Chinese");
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(matches!(
            "xx".parse::<LanguageCode>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn serde_matches_code() {
        for language in LanguageCode::ALL {
            let json = serde_json::to_string(&language).unwrap();
            assert_eq!(json, format!("\"{}\"", language.code()));
        }
    }
}
