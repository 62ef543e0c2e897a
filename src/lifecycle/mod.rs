//! Activation and teardown of the viewer collection.
//!
//! The [`Coordinator`] is the only entry and exit point: it builds one viewer
//! per mount point, starts the shared scheduler, routes host callbacks to the
//! viewers, applies finished asset attachments between ticks, and on
//! deactivation stops the scheduler before releasing every surface.

use std::sync::Arc;

use crate::asset::{install, AssetSource, AttachCompletion};
use crate::catalog::ModelDescriptor;
use crate::error::{PreconditionError, ViewerInitError};
use crate::host::{FrameHandle, FrameTimer, SurfaceProvider};
use crate::input::InputEvent;
use crate::options::Options;
use crate::scheduler::FrameScheduler;
use crate::viewer::{ViewerFactory, ViewerKey, ViewerState};

/// Outcome of [`Coordinator::activate`].
#[derive(Debug)]
pub enum Activation {
    /// Mount points and descriptors did not pair up; nothing was built.
    /// Retry once the host has materialized every mount point.
    Deferred(PreconditionError),
    /// The collection was built. Viewers that failed to initialize are
    /// excluded and reported here.
    Activated {
        /// Viewers now live.
        built: usize,
        /// One entry per viewer that could not be constructed.
        failures: Vec<ViewerInitError>,
    },
    /// The coordinator was already active; nothing changed.
    AlreadyActive,
}

/// Owns the viewer collection and the scheduler's on/off switch.
///
/// Driven from a single thread: the host calls [`activate`](Self::activate)
/// once its mount points exist, forwards each frame handle to
/// [`on_frame`](Self::on_frame), and calls
/// [`deactivate`](Self::deactivate) (or drops the coordinator) on teardown.
pub struct Coordinator<P, A, T>
where
    P: SurfaceProvider,
    A: AssetSource,
    T: FrameTimer,
{
    provider: P,
    assets: A,
    timer: T,
    factory: ViewerFactory,
    descriptors: Vec<Arc<ModelDescriptor>>,
    viewers: Vec<ViewerState<P::Surface>>,
    scheduler: FrameScheduler,
    generation: u64,
    active: bool,
}

impl<P, A, T> Coordinator<P, A, T>
where
    P: SurfaceProvider,
    A: AssetSource,
    T: FrameTimer,
{
    /// Coordinator for the selected `descriptors`, in mount order.
    #[must_use]
    pub fn new(
        provider: P,
        assets: A,
        timer: T,
        options: Options,
        descriptors: Vec<Arc<ModelDescriptor>>,
    ) -> Self {
        Self {
            provider,
            assets,
            timer,
            factory: ViewerFactory::new(options),
            descriptors,
            viewers: Vec::new(),
            scheduler: FrameScheduler::new(),
            generation: 0,
            active: false,
        }
    }

    /// Build one viewer per mount point and start the scheduler.
    ///
    /// `mounts[i]` is paired with the i-th selected descriptor. The counts
    /// must match, otherwise activation is deferred. The scheduler only
    /// starts when at least one viewer was built.
    pub fn activate(&mut self, mounts: &[P::Mount]) -> Activation {
        if self.active {
            return Activation::AlreadyActive;
        }
        if mounts.len() != self.descriptors.len() {
            let err = PreconditionError {
                descriptors: self.descriptors.len(),
                mounts: mounts.len(),
            };
            log::debug!("activation deferred: {err}");
            return Activation::Deferred(err);
        }

        self.generation += 1;
        let mut failures = Vec::new();
        for (i, (descriptor, mount)) in
            self.descriptors.iter().zip(mounts).enumerate()
        {
            let key = ViewerKey::new(i, self.generation);
            match self.factory.create(
                &mut self.provider,
                &mut self.assets,
                key,
                Arc::clone(descriptor),
                mount,
                i,
            ) {
                Ok(viewer) => self.viewers.push(viewer),
                Err(e) => {
                    log::warn!("{e}");
                    failures.push(e);
                }
            }
        }
        self.active = true;

        if !self.viewers.is_empty() {
            if let Err(e) = self.scheduler.start(&mut self.timer) {
                log::error!("{e}");
            }
        }
        log::info!(
            "activated {} of {} viewers (generation {})",
            self.viewers.len(),
            self.descriptors.len(),
            self.generation
        );
        Activation::Activated {
            built: self.viewers.len(),
            failures,
        }
    }

    /// Stop the scheduler, then release every viewer's GPU resources.
    ///
    /// Completions still in flight are discarded when they arrive.
    /// Idempotent.
    pub fn deactivate(&mut self) {
        self.scheduler.stop(&mut self.timer);
        if !self.active {
            return;
        }

        for viewer in &mut self.viewers {
            viewer.release();
        }
        let released = self.viewers.len();
        self.viewers.clear();
        self.generation += 1;
        self.active = false;

        let mut discarded = 0;
        while self.assets.poll().is_some() {
            discarded += 1;
        }
        log::info!(
            "deactivated: released {released} viewers, discarded {discarded} completions"
        );
    }

    /// The host's frame callback: apply finished attachments, then tick.
    ///
    /// Returns whether a tick ran. Stale handles, including any delivered
    /// after [`deactivate`](Self::deactivate), do nothing.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        let _ = self.pump_attachments();
        self.scheduler
            .on_frame(handle, &mut self.timer, &mut self.viewers)
    }

    /// Drain finished attachments and install those addressed to live
    /// viewers. Returns how many were installed.
    pub fn pump_attachments(&mut self) -> usize {
        let mut installed = 0;
        while let Some(completion) = self.assets.poll() {
            if self.apply(completion) {
                installed += 1;
            }
        }
        installed
    }

    fn apply(&mut self, completion: AttachCompletion) -> bool {
        let AttachCompletion { key, path, result } = completion;
        if key.generation() != self.generation {
            log::debug!("discarding stale completion for {path}");
            return false;
        }
        let Some(viewer) = self.viewers.iter_mut().find(|v| v.key() == key)
        else {
            log::debug!("no live viewer for completion of {path}");
            return false;
        };
        let identity = viewer.descriptor().identity;

        match result {
            Ok(node) => match install(viewer, node) {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("viewer {identity}: {path} not installed: {e}");
                    false
                }
            },
            Err(e) => {
                log::warn!("viewer {identity} stays pending: {e}");
                false
            }
        }
    }

    /// Route an input event to the viewer bound to `mount_index`. Returns
    /// whether a viewer consumed it.
    pub fn handle_input(&mut self, mount_index: usize, event: InputEvent) -> bool {
        self.viewer_mut(mount_index)
            .is_some_and(|viewer| viewer.handle_input(event))
    }

    /// Follow a resize of the mount point at `mount_index`.
    pub fn resize(&mut self, mount_index: usize, width: u32, height: u32) {
        if let Some(viewer) = self.viewer_mut(mount_index) {
            viewer.resize(width, height);
        }
    }

    fn viewer_mut(
        &mut self,
        mount_index: usize,
    ) -> Option<&mut ViewerState<P::Surface>> {
        self.viewers
            .iter_mut()
            .find(|v| v.mount_index() == mount_index)
    }

    /// Whether [`activate`](Self::activate) has succeeded and
    /// [`deactivate`](Self::deactivate) has not run since.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Live viewers in mount order.
    #[must_use]
    pub fn viewers(&self) -> &[ViewerState<P::Surface>] {
        &self.viewers
    }

    /// The viewer bound to `mount_index`, if it was built.
    #[must_use]
    pub fn viewer(&self, mount_index: usize) -> Option<&ViewerState<P::Surface>> {
        self.viewers.iter().find(|v| v.mount_index() == mount_index)
    }

    /// Selected descriptors, in mount order.
    #[must_use]
    pub fn descriptors(&self) -> &[Arc<ModelDescriptor>] {
        &self.descriptors
    }

    /// The shared scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Current activation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The frame timer.
    #[must_use]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The frame timer, for hosts that poll it.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// The asset source.
    pub fn asset_source_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    /// The surface provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P, A, T> Drop for Coordinator<P, A, T>
where
    P: SurfaceProvider,
    A: AssetSource,
    T: FrameTimer,
{
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::catalog::Catalog;
    use crate::error::{AssetAttachError, ViewerInitReason};
    use crate::host::FrameQueue;
    use crate::input::MouseButton;
    use crate::testing::{
        triangle_model, FakeMount, FakeProvider, ManualAssetSource, SurfaceLog,
    };
    use crate::viewer::ViewerPhase;

    type TestCoordinator =
        Coordinator<FakeProvider, ManualAssetSource, FrameQueue>;

    fn coordinator(
        identities: &[u32],
    ) -> (TestCoordinator, Rc<RefCell<SurfaceLog>>) {
        let catalog = Catalog::builtin().unwrap();
        let descriptors = identities
            .iter()
            .map(|id| Arc::clone(catalog.get(*id).unwrap()))
            .collect();
        let provider = FakeProvider::default();
        let log = provider.log();
        let coordinator = Coordinator::new(
            provider,
            ManualAssetSource::default(),
            FrameQueue::new(),
            Options::default(),
            descriptors,
        );
        (coordinator, log)
    }

    fn mounts(n: usize) -> Vec<FakeMount> {
        (0..n).map(|_| FakeMount::new(640, 480)).collect()
    }

    fn run_frames(coordinator: &mut TestCoordinator, n: usize) {
        for _ in 0..n {
            let handle = coordinator.timer_mut().take_due().unwrap();
            assert!(coordinator.on_frame(handle));
        }
    }

    fn keys(coordinator: &TestCoordinator) -> Vec<ViewerKey> {
        coordinator.viewers().iter().map(ViewerState::key).collect()
    }

    #[test]
    fn activation_binds_viewers_in_mount_order() {
        let (mut coordinator, _) = coordinator(&[3, 0, 5]);
        let activation = coordinator.activate(&mounts(3));

        assert!(matches!(
            activation,
            Activation::Activated { built: 3, ref failures } if failures.is_empty()
        ));
        let identities: Vec<u32> = coordinator
            .viewers()
            .iter()
            .map(|v| v.descriptor().identity)
            .collect();
        assert_eq!(identities, vec![3, 0, 5]);
        for (i, viewer) in coordinator.viewers().iter().enumerate() {
            assert_eq!(viewer.mount_index(), i);
            assert_eq!(viewer.phase(), ViewerPhase::Pending);
        }
        assert!(coordinator.scheduler().is_running());
        assert_eq!(coordinator.asset_source_mut().requests().len(), 3);
    }

    #[test]
    fn mismatched_counts_defer_activation() {
        let (mut coordinator, _) = coordinator(&[0, 7]);
        let activation = coordinator.activate(&[]);

        assert!(matches!(
            activation,
            Activation::Deferred(PreconditionError {
                descriptors: 2,
                mounts: 0
            })
        ));
        assert!(coordinator.viewers().is_empty());
        assert!(!coordinator.scheduler().is_running());
        assert!(!coordinator.is_active());
        assert_eq!(coordinator.provider().created(), 0);
        assert!(coordinator.timer().pending().is_none());

        // Retrying with the right count succeeds.
        let retry = coordinator.activate(&mounts(2));
        assert!(matches!(retry, Activation::Activated { built: 2, .. }));
    }

    #[test]
    fn empty_selection_activates_without_scheduler() {
        let (mut coordinator, _) = coordinator(&[]);
        let activation = coordinator.activate(&[]);
        assert!(matches!(activation, Activation::Activated { built: 0, .. }));
        assert!(!coordinator.scheduler().is_running());
        assert!(coordinator.timer().pending().is_none());
    }

    #[test]
    fn second_activation_is_rejected() {
        let (mut coordinator, _) = coordinator(&[1]);
        let _ = coordinator.activate(&mounts(1));
        let again = coordinator.activate(&mounts(1));
        assert!(matches!(again, Activation::AlreadyActive));
        assert_eq!(coordinator.viewers().len(), 1);
        assert_eq!(coordinator.timer().requested(), 1);
    }

    #[test]
    fn init_failures_are_excluded() {
        let (mut coordinator, log) = coordinator(&[0, 1, 2]);
        let activation = coordinator.activate(&[
            FakeMount::new(640, 480),
            FakeMount::new(0, 480),
            FakeMount::new(640, 480).refusing_surface(),
        ]);

        let Activation::Activated { built, failures } = activation else {
            unreachable!("expected activation");
        };
        assert_eq!(built, 1);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].identity, 1);
        assert!(matches!(
            failures[0].reason,
            ViewerInitReason::ZeroSizedMount { .. }
        ));
        assert!(matches!(failures[1].reason, ViewerInitReason::Surface(_)));

        run_frames(&mut coordinator, 2);
        assert_eq!(log.borrow().renders, vec![0, 0]);
    }

    #[test]
    fn asset_attaches_at_most_once() {
        let (mut coordinator, _) = coordinator(&[3]);
        let _ = coordinator.activate(&mounts(1));
        let key = keys(&coordinator)[0];

        coordinator.asset_source_mut().complete(key, Ok(triangle_model()));
        coordinator.asset_source_mut().complete(key, Ok(triangle_model()));
        assert_eq!(coordinator.pump_attachments(), 1);

        let viewer = &coordinator.viewers()[0];
        assert_eq!(viewer.phase(), ViewerPhase::Ready);
        assert_eq!(viewer.scene().children().len(), 1);
        let asset = viewer.asset().unwrap();
        assert_eq!(asset.transform.scale, glam::Vec3::new(8.0, 9.0, 8.0));
        assert_eq!(
            asset.transform.translation,
            glam::Vec3::new(2.0, -10.0, 20.0)
        );
    }

    #[test]
    fn failed_asset_keeps_viewer_drawing() {
        let (mut coordinator, log) = coordinator(&[2]);
        let _ = coordinator.activate(&mounts(1));
        let key = keys(&coordinator)[0];
        coordinator.asset_source_mut().complete(
            key,
            Err(AssetAttachError::Unreachable {
                path: "/glbfiles/tv.glb".to_owned(),
                message: "404".to_owned(),
            }),
        );

        run_frames(&mut coordinator, 5);
        let viewer = &coordinator.viewers()[0];
        assert_eq!(viewer.phase(), ViewerPhase::Pending);
        assert_eq!(viewer.scene().lights().len(), 2);
        assert_eq!(log.borrow().renders.len(), 5);
    }

    #[test]
    fn no_ticks_after_deactivate() {
        let (mut coordinator, log) = coordinator(&[0, 1]);
        let _ = coordinator.activate(&mounts(2));
        run_frames(&mut coordinator, 3);
        let handle = coordinator.timer().pending().unwrap();

        coordinator.deactivate();
        assert!(!coordinator.scheduler().is_running());
        assert!(coordinator.timer().pending().is_none());
        assert_eq!(log.borrow().releases, vec![0, 1]);

        // A frame that was already in flight must not tick.
        assert!(!coordinator.on_frame(handle));
        assert_eq!(log.borrow().renders.len(), 6);
        assert_eq!(coordinator.scheduler().ticks(), 3);
    }

    #[test]
    fn deactivate_twice_equals_once() {
        let (mut coordinator, log) = coordinator(&[0]);
        let _ = coordinator.activate(&mounts(1));
        coordinator.deactivate();
        let generation = coordinator.generation();
        coordinator.deactivate();

        assert_eq!(log.borrow().releases, vec![0]);
        assert_eq!(coordinator.generation(), generation);
        assert_eq!(coordinator.timer().cancelled(), 1);
        assert!(coordinator.viewers().is_empty());
    }

    #[test]
    fn deactivate_before_activate_is_noop() {
        let (mut coordinator, log) = coordinator(&[0]);
        coordinator.deactivate();
        assert!(log.borrow().releases.is_empty());
        assert_eq!(coordinator.generation(), 0);
    }

    #[test]
    fn late_completion_from_previous_activation_is_discarded() {
        let (mut coordinator, _) = coordinator(&[4]);
        let _ = coordinator.activate(&mounts(1));
        let old_key = keys(&coordinator)[0];
        coordinator.deactivate();
        let _ = coordinator.activate(&mounts(1));
        let new_key = keys(&coordinator)[0];
        assert_ne!(old_key, new_key);
        assert_eq!(old_key.slot(), new_key.slot());

        coordinator
            .asset_source_mut()
            .complete(old_key, Ok(triangle_model()));
        assert_eq!(coordinator.pump_attachments(), 0);
        assert_eq!(coordinator.viewers()[0].phase(), ViewerPhase::Pending);

        coordinator
            .asset_source_mut()
            .complete(new_key, Ok(triangle_model()));
        assert_eq!(coordinator.pump_attachments(), 1);
    }

    #[test]
    fn pending_viewer_never_spins() {
        let (mut coordinator, log) = coordinator(&[0, 7, 8]);
        let _ = coordinator.activate(&mounts(3));
        let keys = keys(&coordinator);
        coordinator.asset_source_mut().complete(keys[0], Ok(triangle_model()));
        coordinator.asset_source_mut().complete(keys[2], Ok(triangle_model()));

        run_frames(&mut coordinator, 100);

        let viewers = coordinator.viewers();
        let expected = 100.0 * 0.007;
        for i in [0, 2] {
            let spin = viewers[i].asset().unwrap().transform.rotation.y;
            assert!((spin - expected).abs() < 1e-4, "viewer {i}: {spin}");
        }
        assert_eq!(viewers[1].phase(), ViewerPhase::Pending);
        assert!(viewers[1].asset().is_none());
        assert_eq!(log.borrow().renders.len(), 300);
        assert_eq!(coordinator.scheduler().ticks(), 100);
    }

    #[test]
    fn input_reaches_only_its_viewer() {
        let (mut coordinator, _) = coordinator(&[0, 1]);
        let _ = coordinator.activate(&mounts(2));

        let drag = [
            InputEvent::CursorMoved { x: 100.0, y: 100.0 },
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            },
            InputEvent::CursorMoved { x: 160.0, y: 100.0 },
        ];
        for event in drag {
            assert!(coordinator.handle_input(1, event));
        }
        assert!(!coordinator.handle_input(7, InputEvent::Scroll { delta: 1.0 }));

        run_frames(&mut coordinator, 1);
        let eye0 = coordinator.viewers()[0].camera().eye;
        let eye1 = coordinator.viewers()[1].camera().eye;
        assert_eq!(eye0, glam::Vec3::new(0.0, 0.0, 50.0));
        assert!(eye1.x.abs() > 1e-3);
    }

    #[test]
    fn resize_keeps_camera_aspect() {
        let (mut coordinator, _) = coordinator(&[0]);
        let _ = coordinator.activate(&mounts(1));
        let aspect = coordinator.viewers()[0].camera().aspect;

        coordinator.resize(0, 1000, 200);
        let viewer = &coordinator.viewers()[0];
        assert_eq!(
            crate::host::RenderSurface::size(viewer.surface()),
            (1000, 200)
        );
        assert!((viewer.camera().aspect - aspect).abs() < f32::EPSILON);
    }

    #[test]
    fn drop_releases_surfaces() {
        let (mut coordinator, log) = coordinator(&[0, 1]);
        let _ = coordinator.activate(&mounts(2));
        drop(coordinator);
        assert_eq!(log.borrow().releases, vec![0, 1]);
    }
}
