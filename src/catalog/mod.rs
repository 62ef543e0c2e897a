//! Static model catalog and context selection.
//!
//! The catalog is plain data: it can be loaded from TOML or JSON, or taken
//! from the built-in list. Selecting the models relevant to the current
//! context is a pure function over that data.

mod descriptor;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub use descriptor::ModelDescriptor;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::VitrineError;

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.toml");

/// A catalog entry violates an invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Two descriptors share the same identity.
    DuplicateIdentity(u32),
    /// A scale component is zero, negative or not finite.
    InvalidScale {
        /// Identity of the offending descriptor.
        identity: u32,
        /// The rejected scale.
        scale: [f32; 3],
    },
    /// A placement component is not finite.
    InvalidPlacement {
        /// Identity of the offending descriptor.
        identity: u32,
        /// The rejected placement.
        placement: [f32; 3],
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIdentity(id) => {
                write!(f, "identity {id} appears more than once")
            }
            Self::InvalidScale { identity, scale } => write!(
                f,
                "model {identity} has non-positive scale {scale:?}"
            ),
            Self::InvalidPlacement {
                identity,
                placement,
            } => write!(
                f,
                "model {identity} has non-finite placement {placement:?}"
            ),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

/// Ordered, immutable list of model descriptors.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: Vec<Arc<ModelDescriptor>>,
}

impl Catalog {
    /// Build a catalog from descriptors, checking identities and transforms.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on a duplicate identity or an invalid scale
    /// or placement.
    pub fn new(models: Vec<ModelDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = FxHashSet::default();
        for model in &models {
            if !seen.insert(model.identity) {
                return Err(CatalogError::DuplicateIdentity(model.identity));
            }
            if model.scale.iter().any(|c| !c.is_finite() || *c <= 0.0) {
                return Err(CatalogError::InvalidScale {
                    identity: model.identity,
                    scale: model.scale,
                });
            }
            if model.placement.iter().any(|c| !c.is_finite()) {
                return Err(CatalogError::InvalidPlacement {
                    identity: model.identity,
                    placement: model.placement,
                });
            }
        }
        Ok(Self {
            models: models.into_iter().map(Arc::new).collect(),
        })
    }

    /// The catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] if the embedded catalog fails to parse.
    pub fn builtin() -> Result<Self, VitrineError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse a TOML catalog (`[[models]]` tables).
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::CatalogParse`] on malformed TOML and
    /// [`VitrineError::Catalog`] on invariant violations.
    pub fn from_toml_str(content: &str) -> Result<Self, VitrineError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| VitrineError::CatalogParse(e.to_string()))?;
        Ok(Self::new(file.models)?)
    }

    /// Parse a JSON catalog (`{"models": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::CatalogParse`] on malformed JSON and
    /// [`VitrineError::Catalog`] on invariant violations.
    pub fn from_json_str(content: &str) -> Result<Self, VitrineError> {
        let file: CatalogFile = serde_json::from_str(content)
            .map_err(|e| VitrineError::CatalogParse(e.to_string()))?;
        Ok(Self::new(file.models)?)
    }

    /// Load a catalog file. `.json` files are read as JSON, everything else
    /// as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] on I/O, parse or validation failure.
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// All descriptors in catalog order.
    #[must_use]
    pub fn models(&self) -> &[Arc<ModelDescriptor>] {
        &self.models
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalog has no descriptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up one descriptor by identity.
    #[must_use]
    pub fn get(&self, identity: u32) -> Option<&Arc<ModelDescriptor>> {
        self.models.iter().find(|m| m.identity == identity)
    }

    /// Descriptors matching `filter`, in catalog order. An empty result is
    /// valid and renders nothing.
    pub fn subset<F>(&self, filter: F) -> Vec<Arc<ModelDescriptor>>
    where
        F: Fn(&ModelDescriptor) -> bool,
    {
        self.models
            .iter()
            .filter(|m| filter(m))
            .cloned()
            .collect()
    }

    /// Descriptors whose identity equals the requested one. `None` selects
    /// nothing.
    #[must_use]
    pub fn select(&self, identity: Option<u32>) -> Vec<Arc<ModelDescriptor>> {
        identity.map_or_else(Vec::new, |id| self.subset(|m| m.identity == id))
    }
}

/// Convert a raw context parameter (e.g. a route segment) into an identity.
///
/// Surrounding whitespace is ignored and the leading run of ASCII digits is
/// parsed, so `"3"` and `" 3abc"` both select identity 3. Absent, empty or
/// non-numeric values select nothing.
#[must_use]
pub fn identity_from_param(param: Option<&str>) -> Option<u32> {
    let trimmed = param?.trim();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().ok()
}
