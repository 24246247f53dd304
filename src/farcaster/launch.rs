//! Host launch context
//!
//! The embedding host may describe how the app was opened. When the
//! user shared a cast into the app, the descriptor carries that cast.
//! The session asks its provider once, before leaving `loading`.

use std::path::PathBuf;

use axum::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::embed::{EmbedSource, extract_images};
use crate::data::{Cast, CastAuthor};
use crate::error::AppError;

/// Launch descriptor supplied by the host
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchContext {
    #[serde(default)]
    pub location: Option<LaunchLocation>,
}

/// How the app was opened
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchLocation {
    /// Opened from the share sheet with a cast attached
    CastShare { cast: SharedCast },
    /// Launcher, notification, embed, ...
    #[serde(other)]
    Other,
}

/// Cast payload as the host hands it over
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCast {
    pub hash: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub embeds: Vec<Value>,
    pub author: SharedAuthor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAuthor {
    pub fid: u64,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
}

impl LaunchContext {
    /// A context that opened the app on a shared cast
    pub fn cast_share(cast: SharedCast) -> Self {
        Self {
            location: Some(LaunchLocation::CastShare { cast }),
        }
    }

    /// The shared cast, if the app was opened from a share action
    pub fn shared_cast(&self) -> Option<&SharedCast> {
        match &self.location {
            Some(LaunchLocation::CastShare { cast }) => Some(cast),
            _ => None,
        }
    }
}

impl SharedCast {
    /// Convert to a `Cast`. Images are extracted with the lenient
    /// share-context classifier and are not yet validated.
    pub fn to_cast(&self) -> Cast {
        let author = CastAuthor::new(
            self.author.fid,
            self.author.username.as_deref(),
            self.author.display_name.as_deref(),
            self.author.pfp_url.as_deref(),
        );
        Cast::new(
            self.hash.clone(),
            self.text.clone(),
            extract_images(&self.embeds, EmbedSource::Shared),
            author,
        )
    }
}

/// Source of the host launch context
#[async_trait]
pub trait LaunchContextProvider: Send + Sync {
    /// `Ok(None)` when the host supplied nothing.
    async fn launch_context(&self) -> Result<Option<LaunchContext>, AppError>;
}

/// Fixed launch context
#[derive(Debug, Clone, Default)]
pub struct StaticLaunchContext(pub Option<LaunchContext>);

#[async_trait]
impl LaunchContextProvider for StaticLaunchContext {
    async fn launch_context(&self) -> Result<Option<LaunchContext>, AppError> {
        Ok(self.0.clone())
    }
}

/// Launch descriptor the host writes to a JSON file
#[derive(Debug, Clone)]
pub struct FileLaunchContext {
    path: PathBuf,
}

impl FileLaunchContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LaunchContextProvider for FileLaunchContext {
    async fn launch_context(&self) -> Result<Option<LaunchContext>, AppError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No launch context file");
                return Ok(None);
            }
            Err(e) => {
                return Err(AppError::Internal(anyhow::Error::new(e).context(format!(
                    "failed to read launch context {}",
                    self.path.display()
                ))));
            }
        };

        let context = serde_json::from_slice(&raw).map_err(|e| {
            AppError::Internal(anyhow::Error::new(e).context("malformed launch context"))
        })?;
        Ok(Some(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn share_json() -> Value {
        json!({
            "location": {
                "type": "cast_share",
                "cast": {
                    "hash": "0xshare",
                    "text": "look at this",
                    "embeds": ["https://x.com/a.png", "https://x.com/page"],
                    "author": {"fid": 7, "username": "alice", "pfpUrl": "https://x.com/p.png"}
                }
            }
        })
    }

    #[test]
    fn parses_cast_share() {
        let context: LaunchContext = serde_json::from_value(share_json()).unwrap();
        let shared = context.shared_cast().unwrap();
        let cast = shared.to_cast();

        assert_eq!(cast.hash, "0xshare");
        assert_eq!(cast.author.display_name, "alice");
        assert_eq!(
            cast.images,
            Some(vec![
                "https://x.com/a.png".to_string(),
                "https://x.com/page".to_string()
            ])
        );
    }

    #[test]
    fn other_locations_carry_no_cast() {
        let context: LaunchContext =
            serde_json::from_value(json!({"location": {"type": "launcher"}})).unwrap();
        assert!(context.shared_cast().is_none());

        let context: LaunchContext = serde_json::from_value(json!({})).unwrap();
        assert!(context.shared_cast().is_none());
    }

    #[tokio::test]
    async fn file_provider_reads_descriptor() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("launch.json");
        std::fs::write(&path, share_json().to_string()).unwrap();

        let context = assert_ok!(FileLaunchContext::new(&path).launch_context().await);
        assert_eq!(context.unwrap().shared_cast().unwrap().hash, "0xshare");
    }

    #[tokio::test]
    async fn file_provider_missing_file_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let provider = FileLaunchContext::new(dir.path().join("absent.json"));

        assert!(provider.launch_context().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_provider_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("launch.json");
        std::fs::write(&path, "{not json").unwrap();

        assert_err!(FileLaunchContext::new(&path).launch_context().await);
    }
}
