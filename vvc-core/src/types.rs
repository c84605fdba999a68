//! Owned value snapshots shared across the client surface.
//!
//! Everything here is a by-value copy of state owned by the host
//! application; nothing holds a reference back into the COM layer.

use serde::Serialize;

use crate::errors::VvError;

/// Number of rear-panel input channels.  Fixed by the front-end hardware,
/// not reported through the automation object.
pub const REAR_INPUT_CHANNELS: u32 = 8;

/// Test type discriminants as defined by the host.
///
/// The gap at 3 is the host's, not ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestType {
    SystemCheck = 0,
    Sine = 1,
    Random = 2,
    Shock = 4,
    Transient = 5,
    Replay = 6,
}

impl TestType {
    /// Map a host discriminant back to a [`TestType`].
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(TestType::SystemCheck),
            1 => Some(TestType::Sine),
            2 => Some(TestType::Random),
            4 => Some(TestType::Shock),
            5 => Some(TestType::Transient),
            6 => Some(TestType::Replay),
            _ => None,
        }
    }

    /// The host discriminant for this test type.
    pub fn raw(self) -> i32 {
        self as i32
    }

    pub(crate) fn from_host(operation: &str, raw: i32) -> Result<Self, VvError> {
        Self::from_raw(raw)
            .ok_or_else(|| VvError::invocation(operation, format!("unknown test type {raw}")))
    }
}

/// Stop-code snapshot returned by the host's `Status` operation.
#[derive(Debug, Clone, Serialize)]
pub struct TestStatus {
    /// Human-readable stop code, e.g. `"Running"` or `"Max output"`.
    pub stop_code: String,
    /// Host index of the stop code.
    pub stop_code_index: i32,
}

/// Owned snapshot of the host's main window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowState {
    pub title: String,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub is_visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_raw_round_trip() {
        for t in [
            TestType::SystemCheck,
            TestType::Sine,
            TestType::Random,
            TestType::Shock,
            TestType::Transient,
            TestType::Replay,
        ] {
            assert_eq!(TestType::from_raw(t.raw()), Some(t));
        }
    }

    #[test]
    fn test_type_rejects_host_gap() {
        assert_eq!(TestType::from_raw(3), None);
        assert_eq!(TestType::from_raw(-1), None);
        assert_eq!(TestType::from_raw(7), None);
    }

    #[test]
    fn test_status_serialization() {
        let s = TestStatus {
            stop_code: "Running".into(),
            stop_code_index: 0,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"stop_code\":\"Running\""));
        assert!(json.contains("\"stop_code_index\":0"));
    }
}
