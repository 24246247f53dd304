//! Data models
//!
//! Values produced by cast resolution and held by the session.
//! None of them are mutated after construction: a new resolution or a
//! reset replaces them wholesale.

use serde::{Deserialize, Serialize};

// =============================================================================
// Cast Author
// =============================================================================

/// Avatar service used when an author has no profile picture.
const GENERATED_AVATAR_BASE: &str = "https://api.dicebear.com/9.x/lorelei/svg";

/// Author of a cast
///
/// `display_name` and `pfp_url` are never empty: `CastAuthor::new`
/// fills them from the username, "Unknown", or a generated avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastAuthor {
    /// Farcaster numeric identity
    pub fid: u64,
    /// May be empty
    pub username: String,
    pub display_name: String,
    pub pfp_url: String,
}

impl CastAuthor {
    /// Build an author, applying the display-name and avatar fallbacks.
    pub fn new(
        fid: u64,
        username: Option<&str>,
        display_name: Option<&str>,
        pfp_url: Option<&str>,
    ) -> Self {
        let username = present(username).unwrap_or_default().to_string();
        let display_name = present(display_name)
            .or(present(Some(username.as_str())))
            .unwrap_or("Unknown")
            .to_string();
        let pfp_url = present(pfp_url)
            .map(str::to_string)
            .unwrap_or_else(|| generated_avatar_url(fid));

        Self {
            fid,
            username,
            display_name,
            pfp_url,
        }
    }
}

/// Deterministic placeholder avatar keyed by fid
pub fn generated_avatar_url(fid: u64) -> String {
    format!("{GENERATED_AVATAR_BASE}?seed={fid}")
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

// =============================================================================
// Cast
// =============================================================================

/// A single Farcaster post, ready to be explained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cast {
    /// Opaque identifier from the source API
    pub hash: String,
    /// May be empty
    pub text: String,
    /// Image URLs in display order. `None` means "no images"; an empty
    /// list is never stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    pub author: CastAuthor,
}

impl Cast {
    pub fn new(hash: String, text: String, images: Vec<String>, author: CastAuthor) -> Self {
        Self {
            hash,
            text,
            images: non_empty(images),
            author,
        }
    }

    /// Images as a slice; empty when the cast has none
    pub fn image_urls(&self) -> &[String] {
        self.images.as_deref().unwrap_or_default()
    }
}

/// Collapse an empty list to "no images".
pub fn non_empty(images: Vec<String>) -> Option<Vec<String>> {
    if images.is_empty() { None } else { Some(images) }
}

// =============================================================================
// App Status
// =============================================================================

/// Screen the session is on. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppStatus {
    Loading,
    NoCast,
    Explaining,
    Result,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_falls_back_to_username() {
        let author = CastAuthor::new(3, Some("dwr"), Some(""), Some("https://i.imgur.com/x.png"));
        assert_eq!(author.display_name, "dwr");
        assert_eq!(author.pfp_url, "https://i.imgur.com/x.png");
    }

    #[test]
    fn author_falls_back_to_unknown_and_generated_avatar() {
        let author = CastAuthor::new(42, None, None, None);
        assert_eq!(author.username, "");
        assert_eq!(author.display_name, "Unknown");
        assert_eq!(
            author.pfp_url,
            "https://api.dicebear.com/9.x/lorelei/svg?seed=42"
        );
    }

    #[test]
    fn empty_image_list_is_no_images() {
        let cast = Cast::new(
            "0xabc".to_string(),
            "gm".to_string(),
            Vec::new(),
            CastAuthor::new(1, Some("a"), None, None),
        );
        assert_eq!(cast.images, None);
        assert!(cast.image_urls().is_empty());
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&AppStatus::NoCast).unwrap(),
            "\"no-cast\""
        );
    }
}
