//! Per-viewer state.
//!
//! A [`ViewerState`] bundles everything one mount point needs: its surface,
//! camera, orbit controller and scene, plus the handle of the attached asset
//! once it arrives. Viewers never share mutable state.

mod factory;

use std::sync::Arc;

pub use factory::ViewerFactory;

use crate::camera::{Camera, OrbitController};
use crate::catalog::ModelDescriptor;
use crate::host::{RenderError, RenderSurface};
use crate::input::InputEvent;
use crate::scene::{NodeId, Scene, SceneNode};

/// Liveness token for one viewer.
///
/// `slot` is the viewer's position within one activation; `generation`
/// changes on every activation, so completions addressed to a torn-down
/// viewer never match a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerKey {
    slot: usize,
    generation: u64,
}

impl ViewerKey {
    /// Key for `slot` within activation `generation`.
    #[must_use]
    pub const fn new(slot: usize, generation: u64) -> Self {
        Self { slot, generation }
    }

    /// Position within the activation.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot
    }

    /// Activation the key was issued by.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Whether a viewer's model has been attached yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    /// Drawing lights and background only.
    Pending,
    /// The model is in the scene and spins each tick.
    Ready,
}

/// One live viewer.
pub struct ViewerState<S> {
    pub(crate) key: ViewerKey,
    pub(crate) mount_index: usize,
    pub(crate) descriptor: Arc<ModelDescriptor>,
    pub(crate) surface: S,
    pub(crate) camera: Camera,
    pub(crate) controller: OrbitController,
    pub(crate) scene: Scene,
    pub(crate) asset: Option<NodeId>,
    pub(crate) spin_per_tick: f32,
}

impl<S: RenderSurface> ViewerState<S> {
    /// Liveness token.
    #[must_use]
    pub fn key(&self) -> ViewerKey {
        self.key
    }

    /// Index of the mount point this viewer is bound to.
    #[must_use]
    pub fn mount_index(&self) -> usize {
        self.mount_index
    }

    /// The descriptor the viewer was built for.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The orbit controller.
    #[must_use]
    pub fn controller(&self) -> &OrbitController {
        &self.controller
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The attached asset root, once installed.
    #[must_use]
    pub fn asset(&self) -> Option<&SceneNode> {
        self.asset.and_then(|id| self.scene.node(id))
    }

    /// Pending until the asset is installed, Ready afterwards.
    #[must_use]
    pub fn phase(&self) -> ViewerPhase {
        if self.asset.is_some() {
            ViewerPhase::Ready
        } else {
            ViewerPhase::Pending
        }
    }

    /// Advance one frame: damp the controller, spin the asset, draw.
    ///
    /// # Errors
    ///
    /// Returns the surface's [`RenderError`]; controller and spin updates
    /// have already been applied when it does.
    pub fn tick(&mut self) -> Result<(), RenderError> {
        let _ = self.controller.update(&mut self.camera);
        if let Some(node) = self.asset.and_then(|id| self.scene.node_mut(id)) {
            node.transform.rotation.y += self.spin_per_tick;
        }
        self.surface.render(&self.scene, &self.camera)
    }

    /// Route one input event to the orbit controller.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        self.controller.handle_input(&self.camera, event)
    }

    /// Follow a mount point resize. The camera keeps the aspect ratio it
    /// was framed with.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface.resize(width, height);
        self.controller.set_viewport_height(height);
    }

    /// Free the surface's GPU resources.
    pub fn release(&mut self) {
        self.surface.release();
    }
}
