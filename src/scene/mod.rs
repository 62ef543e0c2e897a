//! Per-viewer scene graph: background, lights and a root with child nodes.
//!
//! A [`Scene`] belongs to exactly one viewer. Nothing in it is shared across
//! viewers except immutable mesh data behind `Arc`.

mod light;
mod mesh;
mod node;

use std::sync::Arc;

use glam::Mat4;
pub use light::Light;
pub use mesh::{MeshData, MeshId};
pub use node::{NodeId, SceneNode, Transform};

/// One mesh to draw with its world matrix.
#[derive(Debug, Clone)]
pub struct DrawItem {
    /// Geometry to draw.
    pub mesh: Arc<MeshData>,
    /// Local-to-world matrix.
    pub world: Mat4,
}

/// The root of one viewer's scene.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Clear color (linear RGB).
    pub background: [f32; 3],
    lights: Vec<Light>,
    children: Vec<SceneNode>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0])
    }
}

impl Scene {
    /// Empty scene with the given background color.
    #[must_use]
    pub fn new(background: [f32; 3]) -> Self {
        Self {
            background,
            lights: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Install a light.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Installed lights, in insertion order.
    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Insert a node as a direct child of the root and return its handle.
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        self.children.push(node);
        NodeId(self.children.len() - 1)
    }

    /// Borrow a root child.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.children.get(id.0)
    }

    /// Mutably borrow a root child.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.children.get_mut(id.0)
    }

    /// Root children, in insertion order.
    #[must_use]
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Flatten the hierarchy into world-space draw items.
    #[must_use]
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        for child in &self.children {
            child.visit_meshes(Mat4::IDENTITY, &mut |mesh, world| {
                if !mesh.is_empty() {
                    items.push(DrawItem {
                        mesh: Arc::clone(mesh),
                        world,
                    });
                }
            });
        }
        items
    }
}
