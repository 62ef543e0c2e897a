use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::mesh::MeshData;

/// Local transform: translation, Euler XYZ rotation (radians) and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub translation: Vec3,
    /// Euler rotation in radians, applied in XYZ order.
    pub rotation: Vec3,
    /// Component-wise scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Build from a translation/quaternion/scale triple.
    #[must_use]
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        Self {
            translation,
            rotation: Vec3::new(x, y, z),
            scale,
        }
    }

    /// Rotation as a quaternion.
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local-to-parent matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.quat(),
            self.translation,
        )
    }
}

/// Handle to a direct child of a [`Scene`](super::Scene) root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(super) usize);

/// A node in a viewer's scene hierarchy.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    /// Optional name, taken from the asset when available.
    pub name: Option<String>,
    /// Local transform.
    pub transform: Transform,
    /// Geometry drawn at this node.
    pub mesh: Option<Arc<MeshData>>,
    /// Child nodes.
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// An empty grouping node.
    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A leaf node drawing `mesh`.
    #[must_use]
    pub fn with_mesh(mesh: Arc<MeshData>) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::default()
        }
    }

    /// Whether this node or any descendant has drawable geometry.
    #[must_use]
    pub fn has_geometry(&self) -> bool {
        self.mesh.as_ref().is_some_and(|m| !m.is_empty())
            || self.children.iter().any(Self::has_geometry)
    }

    /// Visit every mesh in the subtree with its world matrix.
    pub fn visit_meshes<F>(&self, parent: Mat4, visit: &mut F)
    where
        F: FnMut(&Arc<MeshData>, Mat4),
    {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = &self.mesh {
            visit(mesh, world);
        }
        for child in &self.children {
            child.visit_meshes(world, visit);
        }
    }
}
