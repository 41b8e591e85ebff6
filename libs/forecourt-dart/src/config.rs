//! Protocol and serial configuration types
//!
//! The address span, nozzle count and decimal scales vary between sites and
//! firmware revisions, so they are configuration rather than constants.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use forecourt_link::{LinkError, Result};

/// DART protocol configuration for one bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DartConfig {
    /// Bus address of pump 0; pump N answers at `base_address + N`
    #[serde(default = "default_base_address")]
    pub base_address: u8,
    /// First valid pump id
    #[serde(default = "default_first_pump")]
    pub first_pump: u8,
    /// Last valid pump id
    #[serde(default = "default_last_pump")]
    pub last_pump: u8,
    /// Addressable nozzles per pump
    #[serde(default = "default_nozzle_count")]
    pub nozzle_count: u8,
    /// Reply window per attempt (milliseconds)
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    /// Attempts per transaction before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between failed attempts (milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Pause between a preset and the authorize command (milliseconds)
    #[serde(default = "default_preset_settle_ms")]
    pub preset_settle_ms: u64,
    /// Decimal places in volume quantities
    #[serde(default = "default_quantity_decimals")]
    pub volume_decimals: u32,
    /// Decimal places in amount quantities
    #[serde(default = "default_quantity_decimals")]
    pub amount_decimals: u32,
    /// Decimal places in unit prices
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
    /// Poll with the fill-info query instead of the bare status query
    #[serde(default)]
    pub poll_fill_info: bool,
}

fn default_base_address() -> u8 {
    0x50
}
fn default_first_pump() -> u8 {
    1
}
fn default_last_pump() -> u8 {
    8
}
fn default_nozzle_count() -> u8 {
    16
}
fn default_response_timeout_ms() -> u64 {
    500
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    100
}
fn default_preset_settle_ms() -> u64 {
    50
}
fn default_quantity_decimals() -> u32 {
    2
}
fn default_price_decimals() -> u32 {
    3
}

impl Default for DartConfig {
    fn default() -> Self {
        Self {
            base_address: default_base_address(),
            first_pump: default_first_pump(),
            last_pump: default_last_pump(),
            nozzle_count: default_nozzle_count(),
            response_timeout_ms: default_response_timeout_ms(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            preset_settle_ms: default_preset_settle_ms(),
            volume_decimals: default_quantity_decimals(),
            amount_decimals: default_quantity_decimals(),
            price_decimals: default_price_decimals(),
            poll_fill_info: false,
        }
    }
}

impl DartConfig {
    /// Reject inconsistent spans before any component consumes the config.
    pub fn validate(&self) -> Result<()> {
        if self.first_pump > self.last_pump {
            return Err(LinkError::config(format!(
                "pump span {}..={} is empty",
                self.first_pump, self.last_pump
            )));
        }
        if self.nozzle_count < 1 || self.nozzle_count > 16 {
            return Err(LinkError::config(format!(
                "nozzle count {} outside 1..=16",
                self.nozzle_count
            )));
        }
        if self.max_attempts < 1 {
            return Err(LinkError::config("max_attempts must be at least 1"));
        }
        if self.response_timeout_ms == 0 {
            return Err(LinkError::config("response timeout must be nonzero"));
        }
        Ok(())
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn preset_settle(&self) -> Duration {
        Duration::from_millis(self.preset_settle_ms)
    }
}

/// Serial line parameters for the bus adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial device path
    pub device: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Data bits (5-8)
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    /// Parity: "none", "even" or "odd"
    #[serde(default = "default_parity")]
    pub parity: String,
}

fn default_baud_rate() -> u32 {
    9600
}
fn default_data_bits() -> u8 {
    8
}
fn default_stop_bits() -> u8 {
    1
}
fn default_parity() -> String {
    "odd".to_string()
}
