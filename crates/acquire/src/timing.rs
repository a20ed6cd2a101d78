use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Fixed waits of the controller, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Calibration settle time. Also the bound on polling for completion.
    pub settle_ms: u32,
    /// Interval between calibration completion polls.
    pub poll_ms: u32,
    /// Pause between loop iterations.
    pub loop_delay_ms: u32,
    /// Always wait `settle_ms` instead of polling for completion.
    pub fixed_settle: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            poll_ms: 1,
            loop_delay_ms: 15,
            fixed_settle: false,
        }
    }
}

/// [`DelayNs`] backed by [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms.into()));
    }
}
