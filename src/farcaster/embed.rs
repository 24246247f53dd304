//! Embed image extraction
//!
//! Embeds arrive as bare strings, `{url}` objects or objects carrying
//! image metadata, depending on where the cast came from. Each entry is
//! first parsed into an `EmbedShape`, then a single classifier decides
//! whether its URL is an image.

use std::collections::HashSet;

use serde_json::Value;

/// File extensions treated as images (compared lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// Image hosting/CDN domains whose URLs are images even without an
/// extension. Subdomains match too.
pub const IMAGE_HOSTS: &[&str] = &[
    "imagedelivery.net",
    "i.imgur.com",
    "res.cloudinary.com",
    "pbs.twimg.com",
    "media.tenor.com",
    "i.seadn.io",
    "wrpcd.net",
    "ipfs.io",
];

/// Where an embed list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedSource {
    /// Resolved through the indexing API
    Indexed,
    /// Supplied by the host's share action; embeds there are almost
    /// always images, so any http(s) reference is accepted
    Shared,
}

/// One embed entry, reduced to its candidate URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedShape {
    /// Bare string entry
    Url(String),
    /// Object with a `url` field and no image metadata
    UrlField(String),
    /// Object the source already classified as an image:
    /// `metadata.image.url`, or `url` with an `image/*` content type
    MetadataImage(String),
}

impl EmbedShape {
    /// Parse a raw embed entry. Entries without any URL (for example
    /// embedded casts) yield `None`.
    pub fn parse(entry: &Value) -> Option<Self> {
        if let Some(url) = entry.as_str() {
            return Some(EmbedShape::Url(url.to_string()));
        }

        let object = entry.as_object()?;
        let url = object.get("url").and_then(Value::as_str);
        let metadata = object.get("metadata");

        if let Some(image_url) = metadata
            .and_then(|metadata| metadata.pointer("/image/url"))
            .and_then(Value::as_str)
        {
            return Some(EmbedShape::MetadataImage(image_url.to_string()));
        }

        let declared_image = metadata
            .and_then(|metadata| metadata.get("content_type"))
            .and_then(Value::as_str)
            .is_some_and(|content_type| content_type.starts_with("image/"));

        url.map(|url| {
            if declared_image {
                EmbedShape::MetadataImage(url.to_string())
            } else {
                EmbedShape::UrlField(url.to_string())
            }
        })
    }

    pub fn url(&self) -> &str {
        match self {
            EmbedShape::Url(url) | EmbedShape::UrlField(url) | EmbedShape::MetadataImage(url) => {
                url
            }
        }
    }

    /// Whether this entry should be explained as an image
    pub fn is_image(&self, source: EmbedSource) -> bool {
        match self {
            EmbedShape::MetadataImage(_) => true,
            EmbedShape::Url(url) | EmbedShape::UrlField(url) => {
                looks_like_image(url)
                    || (source == EmbedSource::Shared && has_http_reference(url))
            }
        }
    }
}

/// Extract image URLs from an embed list.
///
/// Input order is preserved and repeated URLs are kept once.
pub fn extract_images(embeds: &[Value], source: EmbedSource) -> Vec<String> {
    let mut images = Vec::new();
    push_images(&mut images, embeds, source);
    images
}

/// Append the images of `embeds` to `images`, skipping URLs already
/// collected.
pub fn push_images(images: &mut Vec<String>, embeds: &[Value], source: EmbedSource) {
    let mut seen: HashSet<String> = images.iter().cloned().collect();

    for shape in embeds.iter().filter_map(EmbedShape::parse) {
        if !shape.is_image(source) {
            continue;
        }
        let url = shape.url().trim();
        if url.is_empty() || !seen.insert(url.to_string()) {
            continue;
        }
        images.push(url.to_string());
    }
}

/// Extension or host based image heuristic
pub fn looks_like_image(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();

    match url::Url::parse(&lower) {
        Ok(parsed) => {
            let path_hit = parsed
                .path_segments()
                .is_some_and(|mut segments| segments.any(has_image_extension));
            let host_hit = parsed.host_str().is_some_and(is_image_host);
            path_hit || host_hit
        }
        Err(_) => {
            let path = lower.split(['?', '#']).next().unwrap_or_default();
            path.split('/').any(has_image_extension)
        }
    }
}

fn has_image_extension(segment: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| segment.ends_with(ext))
}

fn is_image_host(host: &str) -> bool {
    IMAGE_HOSTS.iter().any(|known| {
        host == *known
            || host
                .strip_suffix(known)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

fn has_http_reference(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains("http://") || lower.contains("https://")
}
