//! Wall clock and entropy from the JS runtime.

use aria_core::ports::ClockPort;

pub struct BrowserClock;

impl ClockPort for BrowserClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn random(&self) -> f64 {
        js_sys::Math::random()
    }
}
