//! Notifications for unit state transitions.
//!
//! # Example
//!
//! ```rust,ignore
//! use kdd_insight::Dashboard;
//!
//! let dashboard = Dashboard::builder(source)
//!     .on_update(|update| {
//!         println!("[{}] {} -> {}", update.generation, update.endpoint, update.state);
//!     })
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use super::unit::RefreshTicket;
use crate::payload::Endpoint;
use crate::view::UnitState;

/// One state transition of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitUpdate {
    pub endpoint: Endpoint,
    /// Generation of the cycle that caused the transition.
    pub generation: u64,
    /// State kind entered (`loading`, `ready`, `fallback`, `unavailable`).
    pub state: String,
    pub message: String,
}

impl UnitUpdate {
    pub(crate) fn new(ticket: &RefreshTicket, state: &UnitState) -> Self {
        let message = match state {
            UnitState::Idle => "Idle".to_string(),
            UnitState::Loading => format!("Loading {}", ticket.endpoint.display_name()),
            UnitState::Ready { defaulted, .. } if defaulted.is_empty() => "Ready".to_string(),
            UnitState::Ready { defaulted, .. } => {
                format!("Ready, {} field(s) defaulted", defaulted.len())
            }
            UnitState::Fallback { reason, .. } => format!("Showing reference figures: {}", reason),
            UnitState::Unavailable { message, .. } => message.clone(),
        };

        Self {
            endpoint: ticket.endpoint,
            generation: ticket.generation,
            state: state.kind().to_string(),
            message,
        }
    }
}

/// Receives unit updates from a dashboard.
///
/// Called from the task running the cycle; implementations should return
/// quickly.
pub trait UnitObserver: Send + Sync {
    fn notify(&self, update: UnitUpdate);
}

/// [`UnitObserver`] backed by a closure.
pub struct ClosureUnitObserver<F>
where
    F: Fn(UnitUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureUnitObserver<F>
where
    F: Fn(UnitUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> UnitObserver for ClosureUnitObserver<F>
where
    F: Fn(UnitUpdate) + Send + Sync,
{
    fn notify(&self, update: UnitUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(UnitUpdate: Send, Sync);
