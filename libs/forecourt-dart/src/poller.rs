//! Telemetry poller
//!
//! A stateful diff filter with no timer of its own: an external scheduler
//! calls `poll_tick`, which issues one query per tracked pump and emits an
//! event only when the decoded telemetry differs structurally from the last
//! emitted value for that pump.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use forecourt_link::{LinkError, Telemetry};

use crate::pump::PumpGateway;

/// Change event produced by a poll tick.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Telemetry differs from the last emitted value for this pump
    Changed {
        pump: u8,
        telemetry: Telemetry,
        at: DateTime<Utc>,
    },
    /// A previously answering pump stopped answering
    Lost {
        pump: u8,
        error: LinkError,
        at: DateTime<Utc>,
    },
}

/// Per-channel poller state: the last emitted telemetry per pump.
#[derive(Debug, Default)]
pub struct StatusPoller {
    last: HashMap<u8, Telemetry>,
}

impl StatusPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll every tracked pump once and collect change events.
    ///
    /// Failures are never discarded silently: a pump that falls silent
    /// while cached emits `Lost` and is forgotten, so its next answer is
    /// emitted as a fresh change.
    pub async fn poll_tick(&mut self, gateway: &PumpGateway, tracked: &[u8]) -> Vec<PollEvent> {
        let mut events = Vec::new();

        for &pump in tracked {
            let result = if gateway.config().poll_fill_info {
                gateway.query_fill_info(pump).await
            } else {
                gateway.query_status(pump).await
            };

            match result {
                Ok(telemetry) => {
                    if self.last.get(&pump) != Some(&telemetry) {
                        self.last.insert(pump, telemetry.clone());
                        events.push(PollEvent::Changed {
                            pump,
                            telemetry,
                            at: Utc::now(),
                        });
                    }
                },
                Err(error) => {
                    warn!("poll of pump {} failed: {}", pump, error);
                    if self.last.remove(&pump).is_some() {
                        events.push(PollEvent::Lost {
                            pump,
                            error,
                            at: Utc::now(),
                        });
                    }
                },
            }
        }

        events
    }

    /// Forget cached telemetry so every pump re-emits on its next answer.
    pub fn clear(&mut self) {
        self.last.clear();
    }
}
