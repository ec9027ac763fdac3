/// Ticket for one generation of the animation-frame loop. The default
/// handle predates every generation and is never live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct FrameHandle(u64);

/// Explicit driver for the repeating simulate-then-render frame. A rebuild
/// calls `restart`, which invalidates every outstanding handle, so a tick
/// scheduled against the previous graph is ignored instead of mutating the
/// replacement.
#[derive(Debug, Default)]
pub(in crate::app) struct FrameLoop {
    generation: u64,
    active: bool,
}

impl FrameLoop {
    pub fn restart(&mut self) -> FrameHandle {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        FrameHandle(self.generation)
    }

    /// Idempotent; safe to call on an already-stopped loop.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_live(&self, handle: FrameHandle) -> bool {
        self.active && handle.0 == self.generation
    }
}
