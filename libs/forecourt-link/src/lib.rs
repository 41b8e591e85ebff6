//! Forecourt Communication Link Library
//!
//! Core abstractions shared by the forecourt protocol crates.
//!
//! # Architecture
//!
//! This library provides:
//! - **Error Types**: `LinkError` and the crate `Result` alias
//! - **Byte Utilities**: packed-BCD codec and the frame checksum engine
//! - **Data Model**: `PumpStatus` and sparse `Telemetry`
//! - **Transport Trait**: `BusLink`, the duplex byte channel the protocol
//!   engine consumes

pub mod bcd;
pub mod crc;
pub mod error;
pub mod traits;
pub mod types;

// Re-export core types
pub use error::{LinkError, Result};
pub use traits::BusLink;
pub use types::{PumpStatus, Telemetry};
