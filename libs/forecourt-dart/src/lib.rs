//! DART Protocol Engine
//!
//! Client implementation of the DART frame protocol spoken by MKR-5 fuel
//! pump controllers on a shared RS-485 multidrop bus.
//!
//! # Architecture
//!
//! ```text
//! forecourt-dart
//!     ├── frame / framer      (envelope codec, candidate extraction)
//!     ├── transaction         (record multiplexing, telemetry decoding)
//!     ├── channel             (DartChannel: serialized send/await/retry)
//!     ├── transport           (SerialLink: BusLink over tokio-serial)
//!     ├── pump                (PumpGateway: high-level operations)
//!     ├── poller              (StatusPoller: change-driven telemetry)
//!     └── config / constants  (protocol parameters, wire constants)
//! ```
//!
//! The byte utilities (packed BCD, checksum), the pump data model and the
//! `BusLink` transport trait live in `forecourt-link`.

pub mod channel;
pub mod config;
pub mod constants;
pub mod frame;
pub mod framer;
pub mod poller;
pub mod pump;
pub mod transaction;
pub mod transport;

pub use channel::DartChannel;
pub use config::{DartConfig, SerialConfig};
pub use frame::Frame;
pub use poller::{PollEvent, StatusPoller};
pub use pump::PumpGateway;
pub use transaction::{PumpCommand, Record};
pub use transport::SerialLink;

// Re-export the shared data model for convenience
pub use forecourt_link::{BusLink, LinkError, PumpStatus, Result, Telemetry};
