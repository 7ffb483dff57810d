//! The media-host collaborator: image storage for product photos.
//!
//! The host accepts raw bytes, resizes server-side to at most
//! [`MAX_DIMENSION`] pixels on the longest edge, and returns a stable
//! reference plus a public URL. Deletion is by reference.

use async_trait::async_trait;
use thiserror::Error;

/// Maximum upload size per image, in bytes (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Longest-edge pixel bound the host resizes to.
pub const MAX_DIMENSION: u32 = 800;

/// Failure at the media-host boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("media host failure: {0}")]
pub struct MediaError(pub String);

/// A stored image: the host's stable reference plus its public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    /// Stable reference, used for deletion.
    pub reference: String,
    /// Public URL.
    pub url: String,
}

/// The media-host collaborator.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload raw image bytes; the host applies the resize transformation.
    async fn upload(&self, bytes: Vec<u8>) -> Result<HostedImage, MediaError>;

    /// Delete a previously uploaded image by reference. Deleting an unknown
    /// reference is a no-op.
    async fn delete(&self, reference: &str) -> Result<(), MediaError>;
}
