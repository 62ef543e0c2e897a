//! Native showcase host backed by winit.
//!
//! Opens one window per selected model and drives a [`Coordinator`] from the
//! event loop: each window is a mount point, frames are delivered through a
//! [`FrameQueue`], and closing any window tears the showcase down.
//!
//! ```no_run
//! # use vitrine::{Catalog, Showcase};
//! let catalog = Catalog::builtin().unwrap();
//! Showcase::builder()
//!     .with_descriptors(catalog.select(Some(3)))
//!     .with_asset_root("public")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::asset::{GltfLoader, ThreadedAssetSource};
use crate::catalog::ModelDescriptor;
use crate::error::VitrineError;
use crate::gpu::render_context::GpuContext;
use crate::gpu::surface::WgpuProvider;
use crate::host::{FrameQueue, MountPoint};
use crate::lifecycle::{Activation, Coordinator};
use crate::options::Options;
use crate::InputEvent;

type NativeCoordinator = Coordinator<
    WgpuProvider<Arc<Window>>,
    ThreadedAssetSource<GltfLoader>,
    FrameQueue,
>;

impl MountPoint for Arc<Window> {
    fn size(&self) -> (u32, u32) {
        let inner = self.inner_size();
        (inner.width, inner.height)
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Showcase`].
pub struct ShowcaseBuilder {
    descriptors: Vec<Arc<ModelDescriptor>>,
    options: Options,
    asset_root: PathBuf,
    title: String,
}

impl ShowcaseBuilder {
    fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            options: Options::default(),
            asset_root: PathBuf::from("."),
            title: "Vitrine".into(),
        }
    }

    /// Models to show, one window each, in window order.
    #[must_use]
    pub fn with_descriptors(
        mut self,
        descriptors: Vec<Arc<ModelDescriptor>>,
    ) -> Self {
        self.descriptors = descriptors;
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Directory asset paths are resolved against.
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Window title prefix.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Showcase`].
    #[must_use]
    pub fn build(self) -> Showcase {
        Showcase {
            descriptors: self.descriptors,
            options: self.options,
            asset_root: self.asset_root,
            title: self.title,
        }
    }
}

// ── Showcase ─────────────────────────────────────────────────────────────

/// A set of native windows, one viewer each.
///
/// Construct via [`Showcase::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Showcase {
    descriptors: Vec<Arc<ModelDescriptor>>,
    options: Options,
    asset_root: PathBuf,
    title: String,
}

impl Showcase {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ShowcaseBuilder {
        ShowcaseBuilder::new()
    }

    /// Open the windows and run the event loop. Blocks until a window is
    /// closed. An empty selection returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] if the event loop or GPU device cannot be
    /// created.
    pub fn run(self) -> Result<(), VitrineError> {
        if self.descriptors.is_empty() {
            log::warn!("no models selected, nothing to show");
            return Ok(());
        }

        let event_loop =
            EventLoop::new().map_err(|e| VitrineError::Host(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ShowcaseApp {
            pending: Some(self),
            windows: Vec::new(),
            coordinator: None,
            error: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| VitrineError::Host(e.to_string()))?;

        app.error.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ShowcaseApp {
    /// Configuration, consumed on first resume.
    pending: Option<Showcase>,
    windows: Vec<Arc<Window>>,
    coordinator: Option<NativeCoordinator>,
    error: Option<VitrineError>,
}

impl ShowcaseApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: VitrineError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn open_windows(
        &mut self,
        event_loop: &ActiveEventLoop,
        showcase: &Showcase,
    ) -> Result<(), VitrineError> {
        for descriptor in &showcase.descriptors {
            let name = descriptor.display_name.trim();
            let title = match &descriptor.offer {
                Some(offer) => {
                    format!("{} - {name} ({offer})", showcase.title)
                }
                None => format!("{} - {name}", showcase.title),
            };
            let attrs = Window::default_attributes()
                .with_title(title)
                .with_inner_size(winit::dpi::LogicalSize::new(640, 480));
            let window = event_loop
                .create_window(attrs)
                .map_err(|e| VitrineError::Host(e.to_string()))?;
            self.windows.push(Arc::new(window));
        }
        Ok(())
    }

    fn mount_index(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id() == id)
    }
}

impl ApplicationHandler for ShowcaseApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(showcase) = self.pending.take() else {
            return;
        };

        if let Err(e) = self.open_windows(event_loop, &showcase) {
            self.fail(event_loop, e);
            return;
        }

        let gpu = match pollster::block_on(GpuContext::new()) {
            Ok(gpu) => Arc::new(gpu),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        let mut coordinator = Coordinator::new(
            WgpuProvider::new(gpu),
            ThreadedAssetSource::new(GltfLoader::new(showcase.asset_root)),
            FrameQueue::new(),
            showcase.options,
            showcase.descriptors,
        );

        match coordinator.activate(&self.windows) {
            Activation::Activated { built: 0, .. } => {
                self.fail(
                    event_loop,
                    VitrineError::Host("no viewer could be created".into()),
                );
                return;
            }
            Activation::Activated { built, failures } => {
                log::info!(
                    "showing {built} models ({} failed)",
                    failures.len()
                );
            }
            Activation::Deferred(e) => {
                self.fail(event_loop, VitrineError::Host(e.to_string()));
                return;
            }
            Activation::AlreadyActive => {}
        }
        self.coordinator = Some(coordinator);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        id: WindowId,
        event: WindowEvent,
    ) {
        let Some(mount_index) = self.mount_index(id) else {
            return;
        };
        let Some(coordinator) = &mut self.coordinator else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                coordinator.deactivate();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                coordinator.resize(mount_index, size.width, size.height);
            }
            other => {
                if let Some(input) = InputEvent::from_window_event(&other) {
                    let _ = coordinator.handle_input(mount_index, input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(coordinator) = &mut self.coordinator else {
            return;
        };
        match coordinator.timer_mut().take_due() {
            Some(handle) => {
                let _ = coordinator.on_frame(handle);
            }
            None => {
                let _ = coordinator.pump_attachments();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Surfaces go before their windows.
        self.coordinator = None;
        self.windows.clear();
    }
}
