//! External frame-clock interface.

/// Host-owned ticker.
///
/// The engine raises `start` when its running set becomes non-empty and
/// `stop` once it drains again, so nothing ticks while nothing animates.
/// While started, the host must call [`Engine::advance`](crate::Engine::advance)
/// each frame with the wall-time delta since the previous call.
pub trait FrameClock {
    fn start(&mut self);
    fn stop(&mut self);
}

/// No-op clock for hosts that drive `advance` unconditionally.
#[derive(Copy, Clone, Debug, Default)]
pub struct ManualClock;

impl FrameClock for ManualClock {
    fn start(&mut self) {}
    fn stop(&mut self) {}
}
