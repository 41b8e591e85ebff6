//! Pump Data Model
//!
//! Status and telemetry types shared by every forecourt protocol
//! implementation and by the upstream request-handling layer.

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

// ============================================================================
// Pump Status
// ============================================================================

/// Pump controller state as reported by firmware.
///
/// The gateway never assigns these states directly; it only requests
/// transitions via commands and observes the result. Code 3 is unused by
/// MKR-5 firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpStatus {
    NotProgrammed,
    Reset,
    Authorized,
    Filling,
    FillingComplete,
    PresetReached,
    SwitchedOff,
    Suspended,
}

impl PumpStatus {
    /// Decode a wire status code.
    ///
    /// Unknown codes are surfaced as errors, never silently mapped.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(PumpStatus::NotProgrammed),
            1 => Ok(PumpStatus::Reset),
            2 => Ok(PumpStatus::Authorized),
            4 => Ok(PumpStatus::Filling),
            5 => Ok(PumpStatus::FillingComplete),
            6 => Ok(PumpStatus::PresetReached),
            7 => Ok(PumpStatus::SwitchedOff),
            8 => Ok(PumpStatus::Suspended),
            other => Err(LinkError::UnknownStatus(other)),
        }
    }

    /// Wire code for this status.
    pub fn code(self) -> u8 {
        match self {
            PumpStatus::NotProgrammed => 0,
            PumpStatus::Reset => 1,
            PumpStatus::Authorized => 2,
            PumpStatus::Filling => 4,
            PumpStatus::FillingComplete => 5,
            PumpStatus::PresetReached => 6,
            PumpStatus::SwitchedOff => 7,
            PumpStatus::Suspended => 8,
        }
    }

    /// Check if fuel is currently flowing.
    pub fn is_dispensing(&self) -> bool {
        matches!(self, PumpStatus::Filling)
    }

    /// Check if a fill has ended and awaits a reset.
    pub fn fill_ended(&self) -> bool {
        matches!(self, PumpStatus::FillingComplete | PumpStatus::PresetReached)
    }
}

impl std::fmt::Display for PumpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PumpStatus::NotProgrammed => write!(f, "NOT_PROGRAMMED"),
            PumpStatus::Reset => write!(f, "RESET"),
            PumpStatus::Authorized => write!(f, "AUTHORIZED"),
            PumpStatus::Filling => write!(f, "FILLING"),
            PumpStatus::FillingComplete => write!(f, "FILLING_COMPLETE"),
            PumpStatus::PresetReached => write!(f, "PRESET_REACHED"),
            PumpStatus::SwitchedOff => write!(f, "SWITCHED_OFF"),
            PumpStatus::Suspended => write!(f, "SUSPENDED"),
        }
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// Decoded pump telemetry.
///
/// Sparse by design: a field is populated only when the corresponding
/// transaction record was present in the reply. Structural equality drives
/// the poller's change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Telemetry {
    /// Pump controller state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PumpStatus>,
    /// Selected nozzle number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nozzle: Option<u8>,
    /// Nozzle lifted out of its holster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nozzle_out: Option<bool>,
    /// Unit price of the running or last fill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Dispensed volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Dispensed amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Alarm code raised by the controller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<u8>,
}

impl Telemetry {
    /// Check if no field was populated.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.nozzle.is_none()
            && self.nozzle_out.is_none()
            && self.price.is_none()
            && self.volume.is_none()
            && self.amount.is_none()
            && self.alarm.is_none()
    }
}
