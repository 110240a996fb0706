//! One visualization unit and its refresh-cycle guard.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::payload::Endpoint;
use crate::view::UnitState;

/// Identifies one refresh cycle of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub endpoint: Endpoint,
    pub generation: u64,
}

/// State holder for one unit.
///
/// Every [`begin`](Self::begin) starts a new generation. A cycle may only
/// [`commit`](Self::commit) while its generation is current and the unit is
/// active, so a slow cycle never overwrites the result of a newer one and
/// nothing lands after [`deactivate`](Self::deactivate).
#[derive(Debug)]
pub struct ViewUnit {
    endpoint: Endpoint,
    generation: AtomicU64,
    active: AtomicBool,
    state: RwLock<UnitState>,
}

static_assertions::assert_impl_all!(ViewUnit: Send, Sync);

impl ViewUnit {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            generation: AtomicU64::new(0),
            active: AtomicBool::new(false),
            state: RwLock::new(UnitState::Idle),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Start a cycle: activate the unit, supersede any cycle in flight and
    /// show `Loading`.
    pub fn begin(&self) -> RefreshTicket {
        let mut state = self.state.write();
        self.active.store(true, Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = UnitState::Loading;
        RefreshTicket {
            endpoint: self.endpoint,
            generation,
        }
    }

    /// Replace the state if `ticket` is still the latest cycle.
    ///
    /// Returns `false` when the result was discarded.
    pub fn commit(&self, ticket: &RefreshTicket, next: UnitState) -> bool {
        let mut state = self.state.write();
        if !self.active.load(Ordering::SeqCst)
            || self.generation.load(Ordering::SeqCst) != ticket.generation
        {
            return false;
        }
        *state = next;
        true
    }

    /// Drop any cycle in flight and return to `Idle`.
    pub fn deactivate(&self) {
        let mut state = self.state.write();
        self.active.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = UnitState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Current state, cloned.
    pub fn state(&self) -> UnitState {
        self.state.read().clone()
    }
}
