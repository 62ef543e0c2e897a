use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Quat, Vec3};

use super::AssetLoader;
use crate::error::AssetAttachError;
use crate::scene::{MeshData, SceneNode, Transform};

#[cfg(feature = "http")]
const MAX_REMOTE_ASSET_BYTES: u64 = 256 * 1024 * 1024;

/// Loads binary glTF (`.glb`) and self-contained glTF files.
///
/// Paths are resolved against `root` with any leading `/` stripped, so
/// catalog paths like `/glbfiles/tv.glb` map into the asset directory. With
/// the `http` feature, `http://` and `https://` paths are downloaded.
#[derive(Debug, Clone)]
pub struct GltfLoader {
    root: PathBuf,
}

impl GltfLoader {
    /// Loader resolving relative paths against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem location a catalog path resolves to.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn read_local(&self, path: &str) -> Result<Vec<u8>, AssetAttachError> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).map_err(|e| AssetAttachError::Unreachable {
            path: path.to_owned(),
            message: format!("{}: {e}", resolved.display()),
        })
    }
}

#[cfg(feature = "http")]
fn fetch_remote(url: &str) -> Result<Vec<u8>, AssetAttachError> {
    let unreachable = |message: String| AssetAttachError::Unreachable {
        path: url.to_owned(),
        message,
    };
    log::info!("downloading {url}");
    let response = ureq::get(url).call().map_err(|e| unreachable(e.to_string()))?;
    let mut body = response.into_body();
    body.with_config()
        .limit(MAX_REMOTE_ASSET_BYTES)
        .read_to_vec()
        .map_err(|e| unreachable(e.to_string()))
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

impl AssetLoader for GltfLoader {
    fn load(&self, path: &str) -> Result<SceneNode, AssetAttachError> {
        if is_remote(path) {
            #[cfg(feature = "http")]
            {
                let bytes = fetch_remote(path)?;
                return parse_gltf(path, &bytes, None);
            }
            #[cfg(not(feature = "http"))]
            {
                return Err(AssetAttachError::Unreachable {
                    path: path.to_owned(),
                    message: "remote assets need the `http` feature".to_owned(),
                });
            }
        }

        let bytes = self.read_local(path)?;
        let resolved = self.resolve(path);
        parse_gltf(path, &bytes, resolved.parent())
    }
}

/// Decode glTF/GLB bytes into a node hierarchy.
///
/// `base` is the directory external buffers are resolved against; `None`
/// only allows embedded buffers. The default scene is used, or the first
/// scene when none is marked default.
///
/// # Errors
///
/// Returns [`AssetAttachError::Malformed`] if the bytes do not decode and
/// [`AssetAttachError::Empty`] if no triangles are found.
pub fn parse_gltf(
    path: &str,
    bytes: &[u8],
    base: Option<&Path>,
) -> Result<SceneNode, AssetAttachError> {
    let malformed = |e: gltf::Error| AssetAttachError::Malformed {
        path: path.to_owned(),
        message: e.to_string(),
    };
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).map_err(malformed)?;
    let buffers =
        gltf::import_buffers(&document, base, blob).map_err(malformed)?;

    let empty = || AssetAttachError::Empty {
        path: path.to_owned(),
    };
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(empty)?;

    let mut root = SceneNode::group(
        scene.name().map_or_else(|| path.to_owned(), str::to_owned),
    );
    root.children = scene
        .nodes()
        .map(|node| convert_node(&node, &buffers))
        .collect();

    if !root.has_geometry() {
        return Err(empty());
    }
    log::debug!("decoded {path}: {} root nodes", root.children.len());
    Ok(root)
}

fn convert_node(
    node: &gltf::Node<'_>,
    buffers: &[gltf::buffer::Data],
) -> SceneNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let mut out = SceneNode {
        name: node.name().map(str::to_owned),
        transform: Transform::from_trs(
            Vec3::from_array(translation),
            Quat::from_array(rotation),
            Vec3::from_array(scale),
        ),
        mesh: None,
        children: Vec::new(),
    };

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if let Some(data) = read_primitive(&primitive, buffers) {
                out.children.push(SceneNode::with_mesh(Arc::new(data)));
            }
        }
    }
    for child in node.children() {
        out.children.push(convert_node(&child, buffers));
    }
    out
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshData> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::debug!("skipping non-triangle primitive {:?}", primitive.mode());
        return None;
    }
    let reader = primitive
        .reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(Iterator::collect)
        .unwrap_or_default();
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect())
        .unwrap_or_default();
    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    let mesh = MeshData::new(positions, normals, indices, base_color);
    (!mesh.is_empty()).then_some(mesh)
}
