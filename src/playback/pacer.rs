use std::time::Duration;

/// Suspension point between playback steps.
///
/// The engine calls `pause` once per step with no lock held, so a pacer may block for as long as
/// it likes without stalling readers of [`crate::Engine::view`].
pub trait Pacer: Send + Sync {
    /// Wait out `delay`.
    fn pause(&self, delay: Duration);
}

/// Sleeps the playback thread for the full delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Returns immediately; for dry runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPause;

impl Pacer for NoPause {
    fn pause(&self, _delay: Duration) {}
}

impl<F> Pacer for F
where
    F: Fn(Duration) + Send + Sync,
{
    fn pause(&self, delay: Duration) {
        self(delay)
    }
}
