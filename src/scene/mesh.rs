use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique mesh identifier, used as the GPU upload cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Indexed triangle mesh with per-vertex normals and a flat base color.
///
/// Immutable once built, so a clone may share its [`MeshId`] and GPU upload.
#[derive(Debug, Clone)]
pub struct MeshData {
    id: MeshId,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
    base_color: [f32; 4],
}

impl MeshData {
    /// Build a mesh. Missing or mismatched normals are replaced with smooth
    /// normals computed from the triangles; an empty index list is treated
    /// as an unindexed triangle list.
    #[must_use]
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        indices: Vec<u32>,
        base_color: [f32; 4],
    ) -> Self {
        let indices = if indices.is_empty() {
            sequential_indices(positions.len())
        } else {
            indices
        };
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            smooth_normals(&positions, &indices)
        };
        Self {
            id: MeshId::next(),
            positions,
            normals,
            indices,
            base_color,
        }
    }

    /// The mesh's cache key.
    #[must_use]
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Vertex positions in local space.
    #[must_use]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Per-vertex normals, same length as [`positions`](Self::positions).
    #[must_use]
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Triangle list indices.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Linear RGBA base color.
    #[must_use]
    pub fn base_color(&self) -> [f32; 4] {
        self.base_color
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has anything to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.len() < 3
    }
}

fn sequential_indices(vertex_count: usize) -> Vec<u32> {
    let usable = vertex_count - vertex_count % 3;
    (0..usable as u32).collect()
}

/// Area-weighted vertex normals. Degenerate vertices fall back to +Y.
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len()
        {
            continue;
        }
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_normals_when_missing() {
        let mesh = MeshData::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Vec::new(),
            vec![0, 1, 2],
            [1.0; 4],
        );
        assert_eq!(mesh.normals().len(), 3);
        for n in mesh.normals() {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn unindexed_mesh_gets_sequential_indices() {
        let mesh = MeshData::new(vec![[0.0; 3]; 7], Vec::new(), Vec::new(), [1.0; 4]);
        assert_eq!(mesh.indices(), [0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn mesh_ids_are_unique() {
        let a = MeshData::new(Vec::new(), Vec::new(), Vec::new(), [1.0; 4]);
        let b = MeshData::new(Vec::new(), Vec::new(), Vec::new(), [1.0; 4]);
        assert_ne!(a.id(), b.id());
        assert!(a.is_empty());
    }

    #[test]
    fn clone_shares_key_and_geometry() {
        let mesh = MeshData::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Vec::new(),
            Vec::new(),
            [0.2, 0.4, 0.6, 1.0],
        );
        let copy = mesh.clone();
        assert_eq!(copy.id(), mesh.id());
        assert_eq!(copy.positions(), mesh.positions());
        assert_eq!(copy.normals(), mesh.normals());
        assert_eq!(copy.indices(), mesh.indices());
        assert_eq!(copy.base_color(), mesh.base_color());
    }
}
