//! Haptic feedback hook for touch devices.

use std::cell::RefCell;

/// Kind of haptic pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticKind {
    /// Light tick when a component becomes selected.
    Selection,
    /// Firmer pulse when a drawn shape is committed.
    Impact,
}

/// Platform haptics. Failures are swallowed by implementations.
pub trait Haptics {
    fn trigger(&self, kind: HapticKind);
}

/// Haptics for platforms without a vibration motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn trigger(&self, _kind: HapticKind) {}
}

/// Records triggered pulses; used by hosts that forward them later and by tests.
#[derive(Debug, Default)]
pub struct RecordingHaptics {
    events: RefCell<Vec<HapticKind>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain recorded pulses.
    pub fn take(&self) -> Vec<HapticKind> {
        self.events.take()
    }
}

impl Haptics for RecordingHaptics {
    fn trigger(&self, kind: HapticKind) {
        log::trace!("Haptic pulse: {kind:?}");
        self.events.borrow_mut().push(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_haptics() {
        let haptics = RecordingHaptics::new();
        haptics.trigger(HapticKind::Selection);
        haptics.trigger(HapticKind::Impact);
        assert_eq!(haptics.take(), vec![HapticKind::Selection, HapticKind::Impact]);
        assert!(haptics.take().is_empty());
        NoHaptics.trigger(HapticKind::Impact);
    }
}
