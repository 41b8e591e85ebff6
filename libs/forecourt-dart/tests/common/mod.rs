//! Shared test support: a scripted bus double standing in for the serial
//! port, plus frame helpers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use forecourt_dart::config::DartConfig;
use forecourt_dart::frame;
use forecourt_dart::{BusLink, DartChannel, PumpGateway, Result};

/// Test-side handle onto a `ScriptedLink`: observed writes plus the reply
/// queue, which may be refilled between operations.
#[derive(Clone)]
pub struct ScriptHandle {
    pub writes: Arc<Mutex<Vec<Vec<u8>>>>,
    pub replies: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl ScriptHandle {
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn written(&self, index: usize) -> Vec<u8> {
        self.writes.lock().unwrap()[index].clone()
    }

    pub fn push_reply(&self, reply: Vec<u8>) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

/// Scripted bus: each write consumes the next queued reply; with the queue
/// empty, reads hang until the caller's reply window closes.
pub struct ScriptedLink {
    replies: Arc<Mutex<VecDeque<Vec<u8>>>>,
    rx: VecDeque<u8>,
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedLink {
    pub fn new(replies: Vec<Vec<u8>>) -> (Self, ScriptHandle) {
        let handle = ScriptHandle {
            writes: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(replies.into())),
        };
        (
            Self {
                replies: Arc::clone(&handle.replies),
                rx: VecDeque::new(),
                writes: Arc::clone(&handle.writes),
            },
            handle,
        )
    }
}

#[async_trait]
impl BusLink for ScriptedLink {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.writes.lock().unwrap().push(data.to_vec());
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            self.rx.extend(reply);
        }
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.rx.is_empty() {
            std::future::pending::<()>().await;
        }
        let count = buf.len().min(self.rx.len());
        for slot in buf.iter_mut().take(count) {
            *slot = self.rx.pop_front().unwrap();
        }
        Ok(count)
    }

    async fn discard_input(&mut self) -> Result<()> {
        self.rx.clear();
        Ok(())
    }
}

/// Config with wire timings shrunk for tests.
pub fn fast_config() -> DartConfig {
    DartConfig {
        response_timeout_ms: 30,
        retry_backoff_ms: 1,
        preset_settle_ms: 1,
        ..Default::default()
    }
}

/// Gateway over a scripted link.
pub fn gateway_with(config: DartConfig, replies: Vec<Vec<u8>>) -> (PumpGateway, ScriptHandle) {
    let (link, handle) = ScriptedLink::new(replies);
    let channel = Arc::new(DartChannel::new(Box::new(link), &config));
    let gateway = PumpGateway::new(channel, config).unwrap();
    (gateway, handle)
}

/// A pump-originated reply frame.
pub fn reply_frame(address: u8, body: &[u8]) -> Vec<u8> {
    frame::build(address, 0xF0, body).unwrap()
}

/// A DC1 status reply.
pub fn status_reply(address: u8, status_code: u8) -> Vec<u8> {
    reply_frame(address, &[0x01, 0x01, status_code])
}

/// Body bytes of a captured wire frame.
pub fn body_of(wire_frame: &[u8]) -> Vec<u8> {
    wire_frame[4..wire_frame.len() - 4].to_vec()
}
