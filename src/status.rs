//! Status records for Waybar custom modules.
//!
//! A record is built deterministically from observed state and printed as one
//! JSON line. Key order is fixed (`text`, `tooltip`, `class`, then `alt` when
//! present) so repeated invocations with unchanged state emit identical bytes.

use anyhow::Result;
use serde::Serialize;

use crate::common::constants::*;
use crate::daemon::DaemonState;

/// CSS class reported to the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    Active,
    Inactive,
}

impl StatusClass {
    /// Glyph for the nightlight module.
    pub fn icon(&self) -> &'static str {
        match self {
            StatusClass::Active => ICON_NIGHTLIGHT_ACTIVE,
            StatusClass::Inactive => ICON_NIGHTLIGHT_INACTIVE,
        }
    }
}

/// One status line for the bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub text: String,
    pub tooltip: String,
    pub class: StatusClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<StatusClass>,
}

impl StatusRecord {
    /// Record for the nightlight module.
    ///
    /// Active shows the Kelvin value (`"3500K"`), anything else shows `"OFF"`.
    /// An unreachable daemon renders the same as a daemon in daylight.
    pub fn nightlight(state: &DaemonState, off_threshold: u32) -> Self {
        let class = if state.is_active(off_threshold) {
            StatusClass::Active
        } else {
            StatusClass::Inactive
        };

        let (text, tooltip) = match (class, state.temperature) {
            (StatusClass::Active, Some(kelvin)) => (
                format!("{kelvin}K"),
                format!("{} Nightlight on ({kelvin}K)", class.icon()),
            ),
            _ => (
                "OFF".to_string(),
                format!("{} Nightlight off", class.icon()),
            ),
        };

        Self {
            text,
            tooltip,
            class,
            alt: None,
        }
    }

    /// Record for the idle-lock module; `alt` mirrors `class`.
    pub fn idle_lock(running: bool) -> Self {
        let (class, icon, tooltip) = if running {
            (
                StatusClass::Active,
                ICON_IDLE_ACTIVE,
                "Idle lock enabled",
            )
        } else {
            (
                StatusClass::Inactive,
                ICON_IDLE_INACTIVE,
                "Idle lock disabled (staying awake)",
            )
        };

        Self {
            text: icon.to_string(),
            tooltip: tooltip.to_string(),
            class,
            alt: Some(class),
        }
    }

    /// Serialize as a single compact JSON line (no trailing newline).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_active_record() {
        let record = StatusRecord::nightlight(&DaemonState::running_at(3500), 6000);
        assert_eq!(record.text, "3500K");
        assert_eq!(record.class, StatusClass::Active);
        assert!(record.tooltip.contains("3500K"));
        assert!(record.tooltip.starts_with(ICON_NIGHTLIGHT_ACTIVE));
    }

    #[test]
    fn test_threshold_boundary_is_off() {
        let record = StatusRecord::nightlight(&DaemonState::running_at(6000), 6000);
        assert_eq!(record.text, "OFF");
        assert_eq!(record.class, StatusClass::Inactive);
    }

    #[test]
    fn test_zero_and_missing_temperature_are_off() {
        for state in [
            DaemonState::running_at(0),
            DaemonState::off(),
            DaemonState {
                running: true,
                temperature: None,
            },
        ] {
            let record = StatusRecord::nightlight(&state, 6000);
            assert_eq!(record.text, "OFF");
            assert_eq!(record.class, StatusClass::Inactive);
        }
    }

    #[test]
    fn test_json_key_order_and_values() {
        let record = StatusRecord::nightlight(&DaemonState::running_at(4000), 6000);
        let json = record.to_json().unwrap();
        assert!(json.starts_with(r#"{"text":"4000K","tooltip":""#));
        assert!(json.ends_with(r#","class":"active"}"#));
        assert!(!json.contains("alt"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_emission_is_byte_identical() {
        let state = DaemonState::running_at(4500);
        let first = StatusRecord::nightlight(&state, 6000).to_json().unwrap();
        let second = StatusRecord::nightlight(&state, 6000).to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_idle_lock_alt_mirrors_class() {
        let on = StatusRecord::idle_lock(true);
        assert_eq!(on.class, StatusClass::Active);
        assert_eq!(on.alt, Some(StatusClass::Active));
        let json = on.to_json().unwrap();
        assert!(json.ends_with(r#""class":"active","alt":"active"}"#));

        let off = StatusRecord::idle_lock(false);
        assert_eq!(off.class, StatusClass::Inactive);
        let json = off.to_json().unwrap();
        assert!(json.ends_with(r#""class":"inactive","alt":"inactive"}"#));
    }

    proptest! {
        #[test]
        fn prop_classification_is_pure(t in 0u32..30_000, k in 1000u32..20_001) {
            let record = StatusRecord::nightlight(&DaemonState::running_at(t), k);
            let expected = 0 < t && t < k;
            prop_assert_eq!(record.class == StatusClass::Active, expected);
            if expected {
                prop_assert_eq!(record.text, format!("{t}K"));
            } else {
                prop_assert_eq!(record.text, "OFF");
            }
        }
    }
}
