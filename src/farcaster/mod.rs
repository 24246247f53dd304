//! Farcaster-facing plumbing
//!
//! - Cast URL normalization
//! - Embed image extraction
//! - Indexing API client (Neynar)
//! - Host launch context

pub mod embed;
pub mod launch;
pub mod neynar;
pub mod url;

pub use embed::{EmbedShape, EmbedSource, extract_images, looks_like_image};
pub use launch::{
    FileLaunchContext, LaunchContext, LaunchContextProvider, LaunchLocation, SharedAuthor,
    SharedCast, StaticLaunchContext,
};
pub use neynar::{ApiAuthor, ApiCast, CastLookup, NeynarClient};
pub use self::url::{cast_url_for, normalize_cast_url};
