//! Cast URL normalization
//!
//! The indexing API only accepts Warpcast-style URLs, so every
//! user- or host-supplied reference is canonicalized here first.

use crate::data::CastAuthor;
use crate::error::AppError;

/// Domain the indexing API understands
pub const PRIMARY_DOMAIN: &str = "warpcast.com";

/// Alternate canonical Farcaster domain, rewritten to `PRIMARY_DOMAIN`
pub const ALTERNATE_DOMAIN: &str = "farcaster.xyz";

/// Canonicalize a cast URL for the indexing API.
///
/// Trims the input, rewrites the alternate domain to the primary one
/// (path untouched) and prepends `https://` when no http(s) scheme is
/// present.
///
/// # Errors
/// `InvalidUrl` when neither domain marker appears in the input.
pub fn normalize_cast_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();

    let normalized = if trimmed.contains(ALTERNATE_DOMAIN) {
        trimmed.replacen(ALTERNATE_DOMAIN, PRIMARY_DOMAIN, 1)
    } else if trimmed.contains(PRIMARY_DOMAIN) {
        trimmed.to_string()
    } else {
        return Err(AppError::InvalidUrl);
    };

    if has_http_scheme(&normalized) {
        Ok(normalized)
    } else {
        Ok(format!("https://{normalized}"))
    }
}

/// Warpcast URL for a cast known only by author and hash.
///
/// Falls back to the fid when the author has no username.
pub fn cast_url_for(author: &CastAuthor, hash: &str) -> String {
    let handle = if author.username.is_empty() {
        author.fid.to_string()
    } else {
        author.username.clone()
    };
    format!("https://{PRIMARY_DOMAIN}/{handle}/{hash}")
}

fn has_http_scheme(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}
