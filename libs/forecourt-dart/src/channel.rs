//! Channel transactor
//!
//! Owns the shared bus and the per-channel sequence toggle. One transaction
//! is in flight at a time: concurrent callers queue on the channel mutex and
//! their I/O is never interleaved. Recoverable faults (timeout, malformed or
//! corrupt reply) are consumed here as retry triggers; only terminal
//! `ExhaustedRetries` escapes.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, warn};

use forecourt_link::{BusLink, LinkError, Result};

use crate::config::DartConfig;
use crate::constants::{CTRL_HOST_DATA, CTRL_SEQ_BIT, ETX, SF};
use crate::frame::{self, Frame};
use crate::framer;
use crate::transaction::{self, Record};

/// Bus handle plus the sequence toggle, guarded together.
struct ChannelState {
    link: Box<dyn BusLink>,
    sequence: bool,
}

/// The shared DART channel.
///
/// The read phase occupies the calling task for up to the reply window.
/// Dropping the `transact` future mid-flight can desynchronize the
/// half-duplex bus; a caller that gives up must detach (spawn) instead of
/// cancelling.
pub struct DartChannel {
    state: Mutex<ChannelState>,
    response_timeout: Duration,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl DartChannel {
    /// Wrap a bus link with the retry parameters from `config`.
    pub fn new(link: Box<dyn BusLink>, config: &DartConfig) -> Self {
        Self {
            state: Mutex::new(ChannelState {
                link,
                sequence: false,
            }),
            response_timeout: config.response_timeout(),
            max_attempts: config.max_attempts,
            retry_backoff: config.retry_backoff(),
        }
    }

    /// Send `records` to `address` and await the validated reply frame.
    pub async fn transact(&self, address: u8, records: &[Record]) -> Result<Frame> {
        self.transact_with_timeout(address, records, self.response_timeout)
            .await
    }

    /// `transact` with a caller-supplied reply window.
    pub async fn transact_with_timeout(
        &self,
        address: u8,
        records: &[Record],
        reply_window: Duration,
    ) -> Result<Frame> {
        let body = transaction::encode_records(records);
        let mut state = self.state.lock().await;

        for attempt in 1..=self.max_attempts {
            // The toggle advances on every attempt, success or not, so the
            // pump can tell a retry from a fresh request.
            let control = CTRL_HOST_DATA | if state.sequence { CTRL_SEQ_BIT } else { 0 };
            state.sequence = !state.sequence;

            let request = frame::build(address, control, &body)?;
            debug!("TX 0x{:02X}: {:02X?}", address, request);

            state.link.discard_input().await?;
            state.link.write_all(&request).await?;

            match Self::read_reply(&mut state.link, address, reply_window).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() => {
                    warn!(
                        "attempt {}/{} to 0x{:02X} failed: {}",
                        attempt, self.max_attempts, address, e
                    );
                },
                Err(e) => return Err(e),
            }

            if attempt < self.max_attempts {
                sleep(self.retry_backoff).await;
            }
        }

        error!(
            "pump 0x{:02X} unreachable after {} attempts",
            address, self.max_attempts
        );
        Err(LinkError::ExhaustedRetries {
            attempts: self.max_attempts,
        })
    }

    /// Read until the end marker (plus the trailing stop byte) or the window
    /// closes, then hunt the received bytes for a valid frame from `address`.
    async fn read_reply(
        link: &mut Box<dyn BusLink>,
        address: u8,
        reply_window: Duration,
    ) -> Result<Frame> {
        let deadline = Instant::now() + reply_window;
        let mut received: Vec<u8> = Vec::with_capacity(64);
        let mut chunk = [0u8; 64];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(LinkError::timeout(format!(
                    "no reply within {}ms",
                    reply_window.as_millis()
                )));
            }

            match timeout(remaining, link.read(&mut chunk)).await {
                Ok(Ok(bytes)) => {
                    received.extend_from_slice(&chunk[..bytes]);
                    if chunk[..bytes].contains(&ETX) {
                        if received.last() != Some(&SF) {
                            // One trailing byte assumed to be the stop marker.
                            let remaining = deadline.saturating_duration_since(Instant::now());
                            if let Ok(Ok(bytes)) = timeout(remaining, link.read(&mut chunk)).await {
                                received.extend_from_slice(&chunk[..bytes]);
                            }
                        }
                        break;
                    }
                },
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    return Err(LinkError::timeout(format!(
                        "no reply within {}ms",
                        reply_window.as_millis()
                    )))
                },
            }
        }

        debug!("RX 0x{:02X}: {:02X?}", address, received);

        for candidate in framer::extract(&mut received) {
            match frame::parse(&candidate) {
                Ok(reply) if reply.address == address => {
                    debug!(
                        "RX frame from 0x{:02X}: {} body bytes",
                        reply.address,
                        reply.body.len()
                    );
                    return Ok(reply);
                },
                Ok(reply) => {
                    debug!("ignoring frame from unexpected address 0x{:02X}", reply.address);
                },
                Err(e) => {
                    warn!("rejecting frame candidate: {}", e);
                },
            }
        }

        Err(LinkError::malformed("no valid frame in reply"))
    }
}
