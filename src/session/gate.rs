use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Non-blocking guard that keeps ticks from overlapping. A tick that finds
/// the gate held is skipped and counted as an overrun.
#[derive(Debug, Default)]
pub struct TickGate {
    busy: AtomicBool,
    skipped: AtomicU64,
    unreported: AtomicBool,
}

/// Held for the duration of one tick.
#[derive(Debug)]
pub struct TickPermit<'a> {
    gate: &'a TickGate,
}

impl Drop for TickPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

impl TickGate {
    pub fn try_enter(&self) -> Option<TickPermit<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(TickPermit { gate: self })
        } else {
            self.record_skipped(1);
            None
        }
    }

    /// Counts ticks that never ran, e.g. fixed-rate slots that elapsed while
    /// the previous tick was still working.
    pub fn record_skipped(&self, ticks: u64) {
        if ticks == 0 {
            return;
        }
        self.skipped.fetch_add(ticks, Ordering::Relaxed);
        self.unreported.store(true, Ordering::Release);
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Whether any skip happened since the last call.
    pub(crate) fn take_overrun(&self) -> bool {
        self.unreported.swap(false, Ordering::AcqRel)
    }
}
