//! Lifecycle state of one visualization unit.

use serde::{Deserialize, Serialize};

use super::models::ViewModel;
use crate::error::AnalyticsError;

/// What a unit currently shows.
///
/// `Ready` and `Fallback` always carry a complete view; `Unavailable` carries
/// only the error that replaced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitState {
    #[default]
    Idle,
    Loading,
    Ready {
        view: ViewModel,
        /// Payload fields that fell back to a named default.
        defaulted: Vec<String>,
    },
    Fallback {
        view: ViewModel,
        reason: String,
    },
    Unavailable {
        code: String,
        message: String,
    },
}

impl UnitState {
    pub fn unavailable(error: &AnalyticsError) -> Self {
        Self::Unavailable {
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }

    pub fn view(&self) -> Option<&ViewModel> {
        match self {
            Self::Ready { view, .. } | Self::Fallback { view, .. } => Some(view),
            _ => None,
        }
    }

    /// True once a cycle has produced a final state.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Ready { .. } | Self::Fallback { .. } | Self::Unavailable { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready { .. } => "ready",
            Self::Fallback { .. } => "fallback",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(UnitState::default(), UnitState::Idle);
        assert!(!UnitState::Loading.is_settled());
    }

    #[test]
    fn test_unavailable_from_error() {
        let error = AnalyticsError::Alignment {
            column: "bins".to_string(),
            expected: 11,
            found: 10,
        };
        let state = UnitState::unavailable(&error);
        assert!(state.is_settled());
        assert!(state.view().is_none());
        match state {
            UnitState::Unavailable { code, .. } => assert_eq!(code, error.error_code()),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(UnitState::Loading).unwrap();
        assert_eq!(json["state"], "loading");
    }
}
