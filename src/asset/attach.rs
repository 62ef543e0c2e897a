use std::fmt;

use crate::host::RenderSurface;
use crate::scene::{NodeId, SceneNode};
use crate::viewer::ViewerState;

/// Why a completed asset was not installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachRejected {
    /// The viewer already has its asset; attachment is write-once.
    AlreadyAttached,
    /// The viewer's surface has been released.
    Released,
}

impl fmt::Display for AttachRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAttached => write!(f, "asset already attached"),
            Self::Released => write!(f, "viewer already released"),
        }
    }
}

impl std::error::Error for AttachRejected {}

/// Install a decoded asset into `viewer`'s scene.
///
/// The node's scale and translation are replaced with the descriptor's
/// `scale` and `placement`; its rotation is kept. Succeeds at most once per
/// viewer.
///
/// # Errors
///
/// Returns [`AttachRejected`] if the viewer already has an asset or has
/// been released. The scene is left untouched.
pub fn install<S: RenderSurface>(
    viewer: &mut ViewerState<S>,
    mut node: SceneNode,
) -> Result<NodeId, AttachRejected> {
    if viewer.asset.is_some() {
        return Err(AttachRejected::AlreadyAttached);
    }
    if viewer.surface.is_released() {
        return Err(AttachRejected::Released);
    }

    node.transform.scale = viewer.descriptor.scale();
    node.transform.translation = viewer.descriptor.placement();
    let id = viewer.scene.add(node);
    viewer.asset = Some(id);
    log::info!(
        "viewer {} ready: {}",
        viewer.descriptor.identity,
        viewer.descriptor.display_name
    );
    Ok(id)
}
