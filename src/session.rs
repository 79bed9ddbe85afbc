//! Holder of the current plan for an editing session.
//!
//! Every recompute takes a ticket before it starts. A result is only swapped
//! in when no newer recompute has started since, so a slow solver answer can
//! never overwrite the result of a later input change.

use crate::models::AddressPlan;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    current: Option<AddressPlan>,
}

#[derive(Debug, Default)]
pub struct PlanSlot {
    state: Mutex<SlotState>,
}

/// Proof of which recompute a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTicket(u64);

impl PlanSlot {
    pub fn new() -> PlanSlot {
        PlanSlot::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a recompute. Any ticket issued earlier becomes stale.
    pub fn begin(&self) -> PlanTicket {
        let mut state = self.lock();
        state.generation += 1;
        PlanTicket(state.generation)
    }

    /// Swap in `plan` if `ticket` is still the latest. Returns whether it was.
    pub fn commit(&self, ticket: PlanTicket, plan: AddressPlan) -> bool {
        let mut state = self.lock();
        if ticket.0 != state.generation {
            log::warn!(
                "discarding stale plan (generation {}, current {})",
                ticket.0,
                state.generation
            );
            return false;
        }
        state.current = Some(plan);
        true
    }

    pub fn current(&self) -> Option<AddressPlan> {
        self.lock().current.clone()
    }
}
