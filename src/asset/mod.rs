//! Asynchronous asset attachment.
//!
//! A viewer's model arrives out of band: the factory submits a request to an
//! [`AssetSource`], which fetches and decodes it elsewhere and queues an
//! [`AttachCompletion`]. The coordinator drains completions on its own thread
//! between ticks and installs each one with [`install`] if the target viewer
//! is still live.

mod attach;
mod gltf_loader;
mod source;

pub use attach::{install, AttachRejected};
pub use gltf_loader::{parse_gltf, GltfLoader};
pub use source::{InlineAssetSource, ThreadedAssetSource};

use crate::error::AssetAttachError;
use crate::scene::SceneNode;
use crate::viewer::ViewerKey;

/// Resolves an opaque asset path into a drawable hierarchy.
pub trait AssetLoader: Send + Sync {
    /// Fetch and decode the asset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetAttachError`] if the resource is unreachable, cannot
    /// be decoded, or holds no geometry.
    fn load(&self, path: &str) -> Result<SceneNode, AssetAttachError>;
}

/// Result of one attachment request, tagged with its target viewer.
#[derive(Debug)]
pub struct AttachCompletion {
    /// Liveness token of the viewer that asked for the asset.
    pub key: ViewerKey,
    /// The requested path.
    pub path: String,
    /// The decoded asset root, or why it could not be produced.
    pub result: Result<SceneNode, AssetAttachError>,
}

/// Starts attachment work and hands back finished results.
pub trait AssetSource {
    /// Begin loading `path` for the viewer identified by `key`. Must not
    /// block on the load itself.
    fn request(&mut self, key: ViewerKey, path: &str);

    /// Next finished attachment, if any. Never blocks.
    fn poll(&mut self) -> Option<AttachCompletion>;
}
