// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Multi-viewer 3D model showcase engine built on wgpu.
//!
//! Vitrine renders any number of independent model viewers side by side.
//! Each viewer owns its own surface, camera, scene and orbit controls, and
//! receives its model asynchronously. One shared frame scheduler advances and
//! draws every live viewer per tick.
//!
//! # Key entry points
//!
//! - [`catalog::Catalog`] - the static list of showcased models
//! - [`lifecycle::Coordinator`] - activation, per-frame driving and teardown
//! - [`scheduler::FrameScheduler`] - the single shared render loop
//! - [`options::Options`] - camera, lighting, control and animation defaults
//!
//! # Architecture
//!
//! The rendering, windowing and model-format libraries sit behind the
//! capability traits in [`host`] and [`asset`]. The crate ships a wgpu
//! backend ([`gpu`]), a glTF loader ([`asset::GltfLoader`]) and, with the
//! `viewer` feature, a winit host that opens one window per viewer.
//!
//! All viewer state is mutated on the thread that drives the
//! [`lifecycle::Coordinator`]. Asset fetch and decode may run on worker
//! threads; their results are queued and applied between ticks.

pub mod asset;
pub mod camera;
pub mod catalog;
pub mod error;
pub mod gpu;
pub mod host;
pub mod input;
pub mod lifecycle;
pub mod options;
pub mod scene;
pub mod scheduler;
pub mod util;
pub mod viewer;

#[cfg(feature = "viewer")]
mod showcase;

#[cfg(test)]
mod testing;

pub use catalog::{Catalog, ModelDescriptor};
pub use error::VitrineError;
pub use input::{InputEvent, MouseButton};
pub use lifecycle::{Activation, Coordinator};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use showcase::{Showcase, ShowcaseBuilder};
