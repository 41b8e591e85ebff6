//! Transaction multiplexer
//!
//! A frame body is an ordered sequence of `[code][len][payload]` records.
//! Order is semantically significant and never rearranged. Decoding is
//! lenient about truncation: a record whose declared length overruns the
//! body ends the walk and the well-formed prefix is returned, since a
//! status-only exchange legitimately yields a single record, or none.

use tracing::{debug, warn};

use forecourt_link::{bcd, PumpStatus, Result, Telemetry};

use crate::config::DartConfig;
use crate::constants::{
    NOZZLE_NUM_MASK, NOZZLE_OUT_BIT, PRICE_BCD_WIDTH, QUANTITY_BCD_WIDTH, TRANS_ALARM,
    TRANS_COMMAND, TRANS_NOZZLE_PRICE, TRANS_STATUS, TRANS_VOLUME_AMOUNT,
};

/// Command sub-codes carried in a CD1 command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PumpCommand {
    ReturnStatus = 0x00,
    ReturnPumpParams = 0x02,
    ReturnIdentity = 0x03,
    ReturnFillInfo = 0x04,
    Reset = 0x05,
    Authorize = 0x06,
    Stop = 0x08,
    SwitchOff = 0x0A,
}

/// One logical transaction inside a frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub code: u8,
    pub payload: Vec<u8>,
}

impl Record {
    pub fn new(code: u8, payload: Vec<u8>) -> Self {
        Self { code, payload }
    }

    /// A CD1 command record carrying one sub-code.
    pub fn command(command: PumpCommand) -> Self {
        Self::new(TRANS_COMMAND, vec![command as u8])
    }
}

/// Concatenate records into a frame body, preserving caller order.
pub fn encode_records(records: &[Record]) -> Vec<u8> {
    let mut body = Vec::with_capacity(records.iter().map(|r| 2 + r.payload.len()).sum());
    for record in records {
        body.push(record.code);
        body.push(record.payload.len() as u8);
        body.extend_from_slice(&record.payload);
    }
    body
}

/// Walk a frame body back into records.
///
/// Truncation is not an error: the walk stops at the first record whose
/// declared length would read past the body end.
pub fn decode_records(body: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    let mut cursor = 0;

    while cursor + 2 <= body.len() {
        let code = body[cursor];
        let len = body[cursor + 1] as usize;
        if cursor + 2 + len > body.len() {
            debug!(
                "record 0x{:02X} declares {} payload bytes with {} remaining, stopping",
                code,
                len,
                body.len() - cursor - 2
            );
            break;
        }
        records.push(Record::new(code, body[cursor + 2..cursor + 2 + len].to_vec()));
        cursor += 2 + len;
    }

    records
}

/// Fold pump-to-host records into sparse telemetry.
///
/// Only fields backed by a record are populated. BCD violations and unknown
/// status codes propagate; record codes outside the DC set are skipped.
pub fn decode_telemetry(records: &[Record], config: &DartConfig) -> Result<Telemetry> {
    let mut telemetry = Telemetry::default();

    for record in records {
        match record.code {
            TRANS_STATUS => {
                let Some(&code) = record.payload.first() else {
                    warn!("status record with empty payload, skipping");
                    continue;
                };
                telemetry.status = Some(PumpStatus::from_code(code)?);
            },
            TRANS_VOLUME_AMOUNT => {
                if record.payload.len() < 2 * QUANTITY_BCD_WIDTH {
                    warn!(
                        "volume/amount record of {} bytes, expected {}, skipping",
                        record.payload.len(),
                        2 * QUANTITY_BCD_WIDTH
                    );
                    continue;
                }
                telemetry.volume = Some(bcd::decode_scaled(
                    &record.payload[..QUANTITY_BCD_WIDTH],
                    config.volume_decimals,
                )?);
                telemetry.amount = Some(bcd::decode_scaled(
                    &record.payload[QUANTITY_BCD_WIDTH..2 * QUANTITY_BCD_WIDTH],
                    config.amount_decimals,
                )?);
            },
            TRANS_NOZZLE_PRICE => {
                let nozzle_byte = match record.payload.len() {
                    1 => record.payload[0],
                    n if n >= PRICE_BCD_WIDTH + 1 => {
                        telemetry.price = Some(bcd::decode_scaled(
                            &record.payload[..PRICE_BCD_WIDTH],
                            config.price_decimals,
                        )?);
                        record.payload[PRICE_BCD_WIDTH]
                    },
                    n => {
                        warn!("nozzle/price record of {} bytes, skipping", n);
                        continue;
                    },
                };
                telemetry.nozzle = Some(nozzle_byte & NOZZLE_NUM_MASK);
                telemetry.nozzle_out = Some(nozzle_byte & NOZZLE_OUT_BIT != 0);
            },
            TRANS_ALARM => {
                let Some(&code) = record.payload.first() else {
                    warn!("alarm record with empty payload, skipping");
                    continue;
                };
                telemetry.alarm = Some(code);
            },
            other => {
                debug!("record 0x{:02X} not mapped to telemetry, skipping", other);
            },
        }
    }

    Ok(telemetry)
}
