//! Core Transport Trait
//!
//! The protocol engine consumes a duplex byte channel through this trait;
//! the physical transport (serial port, test double) lives behind it.

use async_trait::async_trait;

use crate::error::Result;

/// A duplex byte channel onto the shared pump bus.
///
/// Implementations do not frame, validate, or time out; the channel
/// transactor owns all of that. One instance maps to one physical bus.
#[async_trait]
pub trait BusLink: Send {
    /// Write the whole buffer to the bus.
    async fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Read available bytes into `buf`, waiting until at least one arrives.
    ///
    /// Callers bound the wait externally; an implementation must not return
    /// `Ok(0)`.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Drop unread input so a reply is never matched against stale bytes.
    async fn discard_input(&mut self) -> Result<()>;
}
