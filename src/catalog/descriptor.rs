use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Static description of one showcased model.
///
/// Descriptors are created once when a catalog is loaded and are shared
/// read-only (behind an `Arc`) with every viewer built from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ModelDescriptor {
    /// Unique identity within the catalog.
    pub identity: u32,
    /// Human-readable model name.
    pub display_name: String,
    /// Optional promotional label shown next to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    /// Opaque locator resolved by the asset loader.
    pub asset_path: String,
    /// Component-wise scale applied to the asset root (all > 0).
    pub scale: [f32; 3],
    /// World-space translation applied to the asset root.
    pub placement: [f32; 3],
}

impl ModelDescriptor {
    /// Scale as a vector.
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        Vec3::from_array(self.scale)
    }

    /// Placement as a vector.
    #[must_use]
    pub fn placement(&self) -> Vec3 {
        Vec3::from_array(self.placement)
    }
}
