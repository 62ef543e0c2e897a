//! Capabilities the core consumes from its host.
//!
//! The lifecycle core never talks to a window system or GPU API directly.
//! It measures [`MountPoint`]s, asks a [`SurfaceProvider`] for one
//! [`RenderSurface`] per mount point, and registers its per-frame callback
//! with a [`FrameTimer`].

mod timer;

use std::fmt;

pub use timer::{FrameHandle, FrameQueue, FrameTimer};

use crate::camera::Camera;
use crate::scene::Scene;

/// An externally sized anchor a viewer's surface is embedded into.
pub trait MountPoint {
    /// Current size in physical pixels `(width, height)`.
    fn size(&self) -> (u32, u32);
}

/// Errors raised while creating a drawing surface.
#[derive(Debug)]
pub enum SurfaceInitError {
    /// The platform refused to create a surface for the mount point.
    Creation(String),
    /// The surface cannot be configured with the available adapter.
    Unsupported,
}

impl fmt::Display for SurfaceInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creation(msg) => write!(f, "surface creation failed: {msg}"),
            Self::Unsupported => {
                write!(f, "surface configuration not supported by adapter")
            }
        }
    }
}

impl std::error::Error for SurfaceInitError {}

/// Errors raised by a single draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The surface must be reconfigured before the next draw.
    SurfaceLost,
    /// Acquiring the next frame timed out.
    Timeout,
    /// The GPU ran out of memory.
    OutOfMemory,
    /// The surface was released and can no longer draw.
    Released,
    /// Backend-specific failure.
    Other(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceLost => write!(f, "surface lost or outdated"),
            Self::Timeout => write!(f, "timed out acquiring frame"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::Released => write!(f, "surface already released"),
            Self::Other(msg) => write!(f, "render failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// A drawing surface bound to exactly one mount point.
pub trait RenderSurface {
    /// Configured size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Draw `scene` as seen by `camera` and present it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the frame could not be drawn; the caller
    /// logs it and carries on with the next viewer.
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;

    /// Reconfigure for a new mount size. Zero dimensions are ignored.
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Free the underlying GPU resources now. Idempotent.
    fn release(&mut self);

    /// Whether [`release`](Self::release) has run.
    fn is_released(&self) -> bool;
}

/// Creates surfaces for mount points.
pub trait SurfaceProvider {
    /// Mount points this provider can attach to.
    type Mount: MountPoint;
    /// Surfaces it produces.
    type Surface: RenderSurface;

    /// Allocate a surface sized to `mount` and attach it there.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceInitError`] if the surface cannot be created or
    /// configured.
    fn create_surface(
        &mut self,
        mount: &Self::Mount,
    ) -> Result<Self::Surface, SurfaceInitError>;
}
