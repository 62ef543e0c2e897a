//! The single render loop shared by every live viewer.
//!
//! One [`FrameScheduler`] holds at most one frame registration with the
//! host's [`FrameTimer`]. Each delivered frame re-registers and then ticks
//! every viewer in collection order. A failure in one viewer is logged and
//! the remaining viewers still tick.

use std::fmt;

use crate::host::{FrameHandle, FrameTimer, RenderSurface};
use crate::util::frame_timing::FrameTiming;
use crate::viewer::ViewerState;

/// The scheduler was asked to start while already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// A frame registration is already outstanding.
    AlreadyRunning,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "frame scheduler already running"),
        }
    }
}

impl std::error::Error for SchedulerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stopped,
    Running { pending: FrameHandle },
}

/// Drives all viewers from one repeating frame registration.
pub struct FrameScheduler {
    state: State,
    ticks: u64,
    timing: FrameTiming,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// A stopped scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Stopped,
            ticks: 0,
            timing: FrameTiming::new(),
        }
    }

    /// Whether a frame registration is outstanding.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// The outstanding registration, if running.
    #[must_use]
    pub fn pending(&self) -> Option<FrameHandle> {
        match self.state {
            State::Running { pending } => Some(pending),
            State::Stopped => None,
        }
    }

    /// Ticks performed since construction.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Smoothed ticks per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// Register for the first frame.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if a registration is
    /// already outstanding; the existing one is kept.
    pub fn start<T: FrameTimer + ?Sized>(
        &mut self,
        timer: &mut T,
    ) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let pending = timer.request_frame();
        self.state = State::Running { pending };
        self.timing.reset();
        log::debug!("frame scheduler started");
        Ok(())
    }

    /// Cancel the outstanding registration. No further ticks happen until
    /// [`start`](Self::start). Idempotent.
    pub fn stop<T: FrameTimer + ?Sized>(&mut self, timer: &mut T) {
        if let State::Running { pending } = self.state {
            timer.cancel_frame(pending);
            self.state = State::Stopped;
            log::debug!("frame scheduler stopped after {} ticks", self.ticks);
        }
    }

    /// Handle a frame delivered by the host.
    ///
    /// Ignores handles other than the outstanding one, which covers frames
    /// that fire after [`stop`](Self::stop). Otherwise re-registers for the
    /// next frame and ticks every viewer once. Returns whether a tick ran.
    pub fn on_frame<T, S>(
        &mut self,
        handle: FrameHandle,
        timer: &mut T,
        viewers: &mut [ViewerState<S>],
    ) -> bool
    where
        T: FrameTimer + ?Sized,
        S: RenderSurface,
    {
        match self.state {
            State::Running { pending } if pending == handle => {}
            _ => {
                log::trace!("ignoring stale frame {}", handle.id());
                return false;
            }
        }
        let pending = timer.request_frame();
        self.state = State::Running { pending };
        self.tick(viewers);
        true
    }

    fn tick<S: RenderSurface>(&mut self, viewers: &mut [ViewerState<S>]) {
        for viewer in viewers.iter_mut() {
            if let Err(e) = viewer.tick() {
                log::warn!(
                    "viewer {} frame failed: {e}",
                    viewer.descriptor().identity
                );
            }
        }
        self.ticks += 1;
        self.timing.end_frame();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::Catalog;
    use crate::host::FrameQueue;
    use crate::testing::{FakeMount, FakeProvider, FakeSurface, ManualAssetSource};
    use crate::viewer::{ViewerFactory, ViewerKey};

    fn viewers(
        provider: &mut FakeProvider,
        mounts: &[FakeMount],
    ) -> Vec<ViewerState<FakeSurface>> {
        let catalog = Catalog::builtin().unwrap();
        let factory = ViewerFactory::default();
        let mut assets = ManualAssetSource::default();
        mounts
            .iter()
            .enumerate()
            .map(|(i, mount)| {
                factory
                    .create(
                        &mut *provider,
                        &mut assets,
                        ViewerKey::new(i, 1),
                        Arc::clone(&catalog.models()[i]),
                        mount,
                        i,
                    )
                    .ok()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut timer = FrameQueue::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut timer).unwrap();
        assert_eq!(
            scheduler.start(&mut timer),
            Err(SchedulerError::AlreadyRunning)
        );
        assert_eq!(timer.requested(), 1);
    }

    #[test]
    fn ticks_viewers_in_order_and_reregisters() {
        let mut provider = FakeProvider::default();
        let log = provider.log();
        let mut views = viewers(
            &mut provider,
            &[FakeMount::new(10, 10), FakeMount::new(20, 10)],
        );
        let mut timer = FrameQueue::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut timer).unwrap();

        for _ in 0..3 {
            let handle = timer.take_due().unwrap();
            assert!(scheduler.on_frame(handle, &mut timer, &mut views));
        }
        assert_eq!(scheduler.ticks(), 3);
        assert_eq!(log.borrow().renders, vec![0, 1, 0, 1, 0, 1]);
        assert!(timer.pending().is_some());
    }

    #[test]
    fn failing_viewer_does_not_block_others() {
        let mut provider = FakeProvider::default();
        let log = provider.log();
        let mut views = viewers(
            &mut provider,
            &[
                FakeMount::new(10, 10).failing_render(),
                FakeMount::new(10, 10),
            ],
        );
        let mut timer = FrameQueue::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut timer).unwrap();

        let handle = timer.take_due().unwrap();
        assert!(scheduler.on_frame(handle, &mut timer, &mut views));
        assert_eq!(log.borrow().renders, vec![0, 1]);
        assert!(scheduler.is_running());
    }

    #[test]
    fn stale_frames_after_stop_are_ignored() {
        let mut provider = FakeProvider::default();
        let log = provider.log();
        let mut views = viewers(&mut provider, &[FakeMount::new(10, 10)]);
        let mut timer = FrameQueue::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(&mut timer).unwrap();

        let handle = timer.pending().unwrap();
        scheduler.stop(&mut timer);
        scheduler.stop(&mut timer);
        assert_eq!(timer.cancelled(), 1);
        assert!(timer.take_due().is_none());

        assert!(!scheduler.on_frame(handle, &mut timer, &mut views));
        assert_eq!(scheduler.ticks(), 0);
        assert!(log.borrow().renders.is_empty());
        assert!(timer.pending().is_none());
    }
}
