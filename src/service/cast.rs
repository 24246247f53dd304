//! Cast resolution
//!
//! Normalizes the URL, asks the indexing API for the cast and folds a
//! quoted parent into a single `Cast`.

use std::sync::Arc;

use crate::data::{Cast, CastAuthor};
use crate::error::AppError;
use crate::farcaster::embed::{EmbedSource, extract_images, push_images};
use crate::farcaster::{ApiAuthor, ApiCast, CastLookup, normalize_cast_url};

/// Resolves cast URLs into `Cast` values
#[derive(Clone)]
pub struct CastResolver {
    lookup: Arc<dyn CastLookup>,
}

impl CastResolver {
    pub fn new(lookup: Arc<dyn CastLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve a raw, user- or host-supplied cast URL.
    ///
    /// # Errors
    /// `InvalidUrl` before any network call when the URL is not a
    /// Farcaster URL; otherwise whatever the lookup reports.
    pub async fn resolve(&self, raw_url: &str) -> Result<Cast, AppError> {
        let url = normalize_cast_url(raw_url)?;
        let api_cast = self.lookup.cast_by_url(&url).await?;
        let cast = merge_quote(&api_cast);

        tracing::info!(
            hash = %cast.hash,
            images = cast.image_urls().len(),
            quoted = api_cast.quoted_cast().is_some(),
            "Cast resolved"
        );
        Ok(cast)
    }
}

/// Build the `Cast` to explain from an API document.
///
/// For a quote cast the parent is the main subject: its author wins,
/// its images come first and the quote's text is prepended to its text.
pub fn merge_quote(cast: &ApiCast) -> Cast {
    let Some(parent) = cast.quoted_cast() else {
        return Cast::new(
            cast.hash.clone(),
            cast.text().to_string(),
            extract_images(&cast.embeds, EmbedSource::Indexed),
            author_from(&cast.author),
        );
    };

    let mut images = extract_images(&parent.embeds, EmbedSource::Indexed);
    push_images(&mut images, &cast.embeds, EmbedSource::Indexed);

    Cast::new(
        cast.hash.clone(),
        merge_text(cast.text(), parent.text()),
        images,
        author_from(&parent.author),
    )
}

fn merge_text(quote: &str, parent: &str) -> String {
    let quote_has_text = !quote.trim().is_empty();
    let parent_has_text = !parent.trim().is_empty();

    match (quote_has_text, parent_has_text) {
        (true, true) => format!("{quote}\n\nQuoted: {parent}"),
        (true, false) => quote.to_string(),
        (false, _) => parent.to_string(),
    }
}

fn author_from(author: &ApiAuthor) -> CastAuthor {
    CastAuthor::new(
        author.fid,
        author.username.as_deref(),
        author.display_name.as_deref(),
        author.pfp_url.as_deref(),
    )
}
