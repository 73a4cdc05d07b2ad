use std::time::Duration;

use gloo_timers::callback::Timeout;

/// Largest delay `setTimeout` honours; longer delays fire immediately.
const MAX_TIMEOUT_MS: u32 = i32::MAX as u32;

/// Schedules one-shot callbacks.
///
/// Dropping a handle cancels its timer: a callback whose handle is gone never runs.
pub trait TimerScheduler {
    type Handle;

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// `setTimeout` on the browser event loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl TimerScheduler for BrowserScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_millis(delay), callback)
    }
}

fn delay_millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis())
        .unwrap_or(MAX_TIMEOUT_MS)
        .min(MAX_TIMEOUT_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_are_clamped_to_the_set_timeout_range() {
        assert_eq!(delay_millis(Duration::from_secs(240)), 240_000);
        assert_eq!(delay_millis(Duration::from_secs(60 * 60 * 24 * 365)), MAX_TIMEOUT_MS);
    }
}
