/// Opaque token identifying one frame registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wrap a host-assigned registration id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The host-assigned registration id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The host's presentation timing facility.
///
/// `request_frame` asks for one callback at the next presentation
/// opportunity; the host then delivers the returned handle to
/// [`Coordinator::on_frame`](crate::lifecycle::Coordinator::on_frame).
pub trait FrameTimer {
    /// Register for the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a registration. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Single-slot frame timer for hosts that poll.
///
/// Holds at most one outstanding registration. The host calls
/// [`take_due`](Self::take_due) once per presentation opportunity (e.g. each
/// event-loop iteration) and forwards the handle to the coordinator.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl FrameQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the outstanding registration, if any.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// The outstanding registration, if any, without taking it.
    #[must_use]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Total registrations made.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total registrations withdrawn before firing.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameTimer for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        if let Some(stale) = self.pending.replace(handle) {
            log::debug!("frame {} superseded by {}", stale.0, handle.0);
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}
