use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::{CloudSession, RenderSnapshot};

/// Fixed-rate schedule that never catches up: slots that pass while a tick
/// is running are reported as missed and dropped.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    due: Instant,
}

impl Ticker {
    pub fn new(tick_hz: f64, start: Instant) -> Self {
        let interval = Duration::from_secs_f64(1.0 / tick_hz.max(0.001));
        Self {
            interval: interval.max(Duration::from_micros(1)),
            due: start,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }

    /// Closes the slot that was due and schedules the next one. Returns how
    /// many whole slots elapsed while the tick ran.
    pub fn complete(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.due);
        let interval = self.interval.as_nanos();
        let slots = elapsed.as_nanos().div_ceil(interval).max(1);
        let missed = slots - 1;

        let advance = u32::try_from(slots).unwrap_or(u32::MAX);
        self.due += self.interval * advance;
        u64::try_from(missed).unwrap_or(u64::MAX)
    }
}

/// Shared switches for a running ticker.
#[derive(Debug, Default)]
pub struct TickerControl {
    paused: AtomicBool,
    stopped: AtomicBool,
}

impl TickerControl {
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Ticks `session` at its configured rate on the calling thread until
/// `on_tick` breaks or `control` is stopped. A skipped tick reaches
/// `on_tick` as `None`.
pub fn run_fixed_rate(
    session: &CloudSession,
    control: &TickerControl,
    mut on_tick: impl FnMut(Option<RenderSnapshot>) -> ControlFlow<()>,
) {
    let mut ticker = Ticker::new(session.config().tick_hz, Instant::now());
    tracing::debug!(interval = ?ticker.interval(), "ticker started");

    while !control.is_stopped() {
        let wait = ticker.time_until_due(Instant::now());
        if !wait.is_zero() {
            thread::sleep(wait);
        }

        if control.is_paused() {
            ticker.complete(Instant::now());
            continue;
        }

        let snapshot = session.tick();
        let missed = ticker.complete(Instant::now());
        if missed > 0 {
            session.tick_gate().record_skipped(missed);
            tracing::debug!(missed, "tick overran its slot");
        }

        if on_tick(snapshot).is_break() {
            break;
        }
    }

    tracing::debug!("ticker stopped");
}
