//! wgpu backend for the host capabilities.
//!
//! [`GpuContext`](render_context::GpuContext) owns the device shared by all
//! viewers; [`WgpuProvider`](surface::WgpuProvider) turns window-like mount
//! points into [`WgpuSurface`](surface::WgpuSurface)s.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Model shader, vertex layouts and per-frame uniform packing.
pub mod pipeline;
/// wgpu instance, adapter, device and queue initialization.
pub mod render_context;
/// Per-viewer surfaces and the provider that creates them.
pub mod surface;
