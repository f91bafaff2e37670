//! At-most-once guard for a single logical observation.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of one observation
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationState {
    NotStarted = 0,
    Started = 1,
    Ended = 2,
}

impl ObservationState {
    #[inline]
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ObservationState::NotStarted,
            1 => ObservationState::Started,
            _ => ObservationState::Ended,
        }
    }
}

/// Atomic tri-state guard; `Ended` is terminal.
#[derive(Debug)]
pub struct ObservationGuard {
    state: AtomicU8,
}

impl ObservationGuard {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ObservationState::NotStarted as u8),
        }
    }

    #[inline]
    pub fn state(&self) -> ObservationState {
        ObservationState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is(&self, state: ObservationState) -> bool {
        self.state() == state
    }

    /// Compare-and-set from `from` to `to`; false if the state was not `from`.
    /// Nothing leaves `Ended`.
    pub fn transition(&self, from: ObservationState, to: ObservationState) -> bool {
        if from == ObservationState::Ended {
            return false;
        }
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Move to `Ended` from any other state. Exactly one caller ever gets `true`.
    pub fn finish(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == ObservationState::Ended as u8 {
                return false;
            }
            match self.state.compare_exchange_weak(
                current,
                ObservationState::Ended as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for ObservationGuard {
    fn default() -> Self {
        Self::new()
    }
}
