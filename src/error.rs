//! Crate-level error types.
//!
//! Per-viewer failures ([`ViewerInitError`], [`AssetAttachError`]) are
//! isolated: they exclude or degrade one viewer and never abort the others.
//! [`PreconditionError`] defers activation instead of failing it.

use std::fmt;

use crate::catalog::CatalogError;
use crate::gpu::render_context::GpuInitError;
use crate::host::SurfaceInitError;

/// Errors produced by the vitrine crate outside the per-viewer taxonomy.
#[derive(Debug)]
pub enum VitrineError {
    /// GPU device initialization failure.
    Gpu(GpuInitError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Catalog file could not be parsed.
    CatalogParse(String),
    /// Catalog parsed but violates an invariant.
    Catalog(CatalogError),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Host event-loop failure.
    Host(String),
}

impl fmt::Display for VitrineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::CatalogParse(msg) => {
                write!(f, "catalog parse error: {msg}")
            }
            Self::Catalog(e) => write!(f, "invalid catalog: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Host(msg) => write!(f, "host error: {msg}"),
        }
    }
}

impl std::error::Error for VitrineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GpuInitError> for VitrineError {
    fn from(e: GpuInitError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for VitrineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<CatalogError> for VitrineError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

/// Why a viewer could not be constructed.
#[derive(Debug)]
pub enum ViewerInitReason {
    /// The mount point measured zero in at least one dimension.
    ZeroSizedMount {
        /// Measured width in physical pixels.
        width: u32,
        /// Measured height in physical pixels.
        height: u32,
    },
    /// The surface provider could not create a drawing surface.
    Surface(SurfaceInitError),
}

/// A viewer failed to initialize. Fatal to that one viewer only.
#[derive(Debug)]
pub struct ViewerInitError {
    /// Identity of the descriptor the viewer was built for.
    pub identity: u32,
    /// Underlying cause.
    pub reason: ViewerInitReason,
}

impl fmt::Display for ViewerInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ViewerInitReason::ZeroSizedMount { width, height } => write!(
                f,
                "viewer {} has a zero-sized mount point ({width}x{height})",
                self.identity
            ),
            ViewerInitReason::Surface(e) => {
                write!(f, "viewer {} surface init failed: {e}", self.identity)
            }
        }
    }
}

impl std::error::Error for ViewerInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            ViewerInitReason::Surface(e) => Some(e),
            ViewerInitReason::ZeroSizedMount { .. } => None,
        }
    }
}

/// An asset could not be attached. The viewer stays pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetAttachError {
    /// The resource could not be read or fetched.
    Unreachable {
        /// The asset path as given by the descriptor.
        path: String,
        /// Loader-specific detail.
        message: String,
    },
    /// The resource was read but could not be decoded.
    Malformed {
        /// The asset path as given by the descriptor.
        path: String,
        /// Decoder-specific detail.
        message: String,
    },
    /// The resource decoded to nothing drawable.
    Empty {
        /// The asset path as given by the descriptor.
        path: String,
    },
}

impl fmt::Display for AssetAttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable { path, message } => {
                write!(f, "asset {path} unreachable: {message}")
            }
            Self::Malformed { path, message } => {
                write!(f, "asset {path} malformed: {message}")
            }
            Self::Empty { path } => {
                write!(f, "asset {path} contains no drawable geometry")
            }
        }
    }
}

impl std::error::Error for AssetAttachError {}

/// Mount points and selected descriptors do not pair up 1:1.
///
/// Expected while the host is still materializing its mount points;
/// activation is deferred and may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreconditionError {
    /// Number of selected descriptors.
    pub descriptors: usize,
    /// Number of mount points offered.
    pub mounts: usize,
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mount points offered for {} descriptors",
            self.mounts, self.descriptors
        )
    }
}

impl std::error::Error for PreconditionError {}
