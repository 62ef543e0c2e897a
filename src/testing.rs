//! In-memory host doubles for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::asset::{AssetSource, AttachCompletion};
use crate::camera::Camera;
use crate::error::AssetAttachError;
use crate::host::{
    MountPoint, RenderError, RenderSurface, SurfaceInitError, SurfaceProvider,
};
use crate::scene::{MeshData, Scene, SceneNode};
use crate::viewer::ViewerKey;

#[derive(Debug, Clone, Copy)]
pub struct FakeMount {
    width: u32,
    height: u32,
    refuse_surface: bool,
    fail_render: bool,
}

impl FakeMount {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            refuse_surface: false,
            fail_render: false,
        }
    }

    pub fn refusing_surface(mut self) -> Self {
        self.refuse_surface = true;
        self
    }

    pub fn failing_render(mut self) -> Self {
        self.fail_render = true;
        self
    }
}

impl MountPoint for FakeMount {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// What every fake surface did, shared with the test.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    /// Surface ids in draw order.
    pub renders: Vec<usize>,
    /// Surface ids in release order.
    pub releases: Vec<usize>,
    /// Camera eyes seen per draw, parallel to `renders`.
    pub eyes: Vec<glam::Vec3>,
}

pub struct FakeSurface {
    id: usize,
    size: (u32, u32),
    fail_render: bool,
    released: bool,
    log: Rc<RefCell<SurfaceLog>>,
}

impl RenderSurface for FakeSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(
        &mut self,
        _scene: &Scene,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        let mut log = self.log.borrow_mut();
        log.renders.push(self.id);
        log.eyes.push(camera.eye);
        if self.fail_render {
            return Err(RenderError::Other("injected".to_owned()));
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.log.borrow_mut().releases.push(self.id);
        }
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[derive(Default)]
pub struct FakeProvider {
    created: usize,
    log: Rc<RefCell<SurfaceLog>>,
}

impl FakeProvider {
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn log(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(&self.log)
    }
}

impl SurfaceProvider for FakeProvider {
    type Mount = FakeMount;
    type Surface = FakeSurface;

    fn create_surface(
        &mut self,
        mount: &FakeMount,
    ) -> Result<FakeSurface, SurfaceInitError> {
        if mount.refuse_surface {
            return Err(SurfaceInitError::Creation("refused".to_owned()));
        }
        let id = self.created;
        self.created += 1;
        Ok(FakeSurface {
            id,
            size: mount.size(),
            fail_render: mount.fail_render,
            released: false,
            log: Rc::clone(&self.log),
        })
    }
}

/// Asset source whose completions the test delivers by hand, in any order.
#[derive(Default)]
pub struct ManualAssetSource {
    requests: Vec<(ViewerKey, String)>,
    ready: VecDeque<AttachCompletion>,
}

impl ManualAssetSource {
    pub fn requests(&self) -> &[(ViewerKey, String)] {
        &self.requests
    }

    pub fn complete(
        &mut self,
        key: ViewerKey,
        result: Result<SceneNode, AssetAttachError>,
    ) {
        let path = self
            .requests
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, p)| p.clone())
            .unwrap_or_default();
        self.ready.push_back(AttachCompletion { key, path, result });
    }
}

impl AssetSource for ManualAssetSource {
    fn request(&mut self, key: ViewerKey, path: &str) {
        self.requests.push((key, path.to_owned()));
    }

    fn poll(&mut self) -> Option<AttachCompletion> {
        self.ready.pop_front()
    }
}

pub fn triangle_model() -> SceneNode {
    let mut root = SceneNode::group("model");
    root.children.push(SceneNode::with_mesh(std::sync::Arc::new(
        MeshData::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Vec::new(),
            Vec::new(),
            [1.0; 4],
        ),
    )));
    root
}
