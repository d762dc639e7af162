use alloc::sync::Arc;
use core::cell::Cell;

/// Invoked when a render first becomes pending, so the host environment can
/// arrange for `flush` to run at the next frame/microtask.
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// Coalesces render requests into a single pending pass.
///
/// This is the explicit form of the microtask/rAF deferral browser engines
/// rely on: any number of scroll events or mutations between frames collapse
/// into one pending flag; only the latest desired window is ever rendered.
/// The wake callback fires once per pending transition, never per request.
pub struct RenderQueue {
    pending: Cell<bool>,
    wake: Option<WakeCallback>,
}

impl RenderQueue {
    pub fn new(wake: Option<WakeCallback>) -> Self {
        Self {
            pending: Cell::new(false),
            wake,
        }
    }

    /// Marks a render as pending. Returns `true` when this request caused
    /// the pending transition (and the wake callback, if any, was invoked).
    pub fn request(&self) -> bool {
        if self.pending.replace(true) {
            return false;
        }
        if let Some(wake) = &self.wake {
            wake();
        }
        true
    }

    /// Consumes the pending flag.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

impl core::fmt::Debug for RenderQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderQueue")
            .field("pending", &self.pending.get())
            .field("wake", &self.wake.as_ref().map(|_| ".."))
            .finish()
    }
}
