//! Camera system for per-viewer scene viewing.
//!
//! Provides a perspective camera and damped orbit controls.

/// Damped orbit controller driven by platform-agnostic input.
pub mod controller;
/// Core camera struct and GPU uniform type.
pub mod core;

pub use self::controller::OrbitController;
pub use self::core::{Camera, CameraUniform};
