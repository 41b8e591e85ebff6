//! Pump facade
//!
//! Maps high-level pump operations onto transaction sets, runs them through
//! the channel transactor and decodes the replies. Caller contract
//! violations are rejected before any bus access; an unresponsive bus
//! surfaces as `NoResponse`, a pump that answered without records as
//! `NoTelemetry`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info};

use forecourt_link::{bcd, LinkError, Result, Telemetry};

use crate::channel::DartChannel;
use crate::config::DartConfig;
use crate::constants::{
    PRESET_BCD_WIDTH, PRICE_BCD_WIDTH, TRANS_ALLOW_NOZZLES, TRANS_PRESET_AMOUNT,
    TRANS_PRESET_VOLUME, TRANS_PRICE_UPDATE, TRANS_RESUME, TRANS_SUSPEND,
};
use crate::frame::Frame;
use crate::transaction::{decode_records, decode_telemetry, PumpCommand, Record};

/// High-level interface to the pumps on one DART channel.
pub struct PumpGateway {
    channel: Arc<DartChannel>,
    config: DartConfig,
}

impl PumpGateway {
    /// Build a gateway over `channel`, validating `config` up front.
    pub fn new(channel: Arc<DartChannel>, config: DartConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { channel, config })
    }

    pub fn config(&self) -> &DartConfig {
        &self.config
    }

    /// Bus address for a pump id, rejecting ids outside the configured span.
    fn address_of(&self, pump: u8) -> Result<u8> {
        if !(self.config.first_pump..=self.config.last_pump).contains(&pump) {
            return Err(LinkError::invalid_input(format!(
                "pump id {} outside configured span {}..={}",
                pump, self.config.first_pump, self.config.last_pump
            )));
        }
        Ok(self.config.base_address.wrapping_add(pump))
    }

    fn check_nozzle(&self, nozzle: u8) -> Result<()> {
        if !(1..=self.config.nozzle_count).contains(&nozzle) {
            return Err(LinkError::invalid_input(format!(
                "nozzle {} outside 1..={}",
                nozzle, self.config.nozzle_count
            )));
        }
        Ok(())
    }

    /// Transact at the channel level, reporting an unreachable pump upward
    /// as `NoResponse`.
    async fn transact_at(&self, address: u8, records: &[Record]) -> Result<Frame> {
        match self.channel.transact(address, records).await {
            Ok(reply) => Ok(reply),
            Err(LinkError::ExhaustedRetries { .. }) => Err(LinkError::NoResponse),
            Err(e) => Err(e),
        }
    }

    /// Transact and decode the reply into telemetry.
    async fn exchange(&self, address: u8, records: &[Record]) -> Result<Telemetry> {
        let reply = self.transact_at(address, records).await?;
        let records = decode_records(&reply.body);
        if records.is_empty() {
            debug!("pump 0x{:02X} answered without records", address);
            return Err(LinkError::NoTelemetry);
        }
        decode_telemetry(&records, &self.config)
    }

    async fn command(&self, pump: u8, command: PumpCommand) -> Result<Telemetry> {
        let address = self.address_of(pump)?;
        self.exchange(address, &[Record::command(command)]).await
    }

    /// Follow a data-less command with a status query; these commands are
    /// acknowledged without telemetry records.
    async fn command_then_status(&self, address: u8, record: Record) -> Result<Telemetry> {
        self.transact_at(address, &[record]).await?;
        self.exchange(address, &[Record::command(PumpCommand::ReturnStatus)])
            .await
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Current pump status.
    pub async fn query_status(&self, pump: u8) -> Result<Telemetry> {
        self.command(pump, PumpCommand::ReturnStatus).await
    }

    /// Running fill data: volume, amount and nozzle state.
    pub async fn query_fill_info(&self, pump: u8) -> Result<Telemetry> {
        self.command(pump, PumpCommand::ReturnFillInfo).await
    }

    /// Query every configured pump, recording an explicit per-pump outcome.
    pub async fn scan(&self) -> Vec<(u8, Result<Telemetry>)> {
        let mut results = Vec::new();
        for pump in self.config.first_pump..=self.config.last_pump {
            results.push((pump, self.query_status(pump).await));
        }
        results
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Authorize a fill, optionally preset by volume or amount (not both).
    pub async fn authorize(
        &self,
        pump: u8,
        volume: Option<f64>,
        amount: Option<f64>,
    ) -> Result<Telemetry> {
        let preset = match (volume, amount) {
            (Some(_), Some(_)) => {
                return Err(LinkError::invalid_input(
                    "volume and amount presets are mutually exclusive",
                ))
            },
            (Some(v), None) => {
                if v <= 0.0 {
                    return Err(LinkError::invalid_input("preset volume must be positive"));
                }
                Some(Record::new(
                    TRANS_PRESET_VOLUME,
                    bcd::encode(v, self.config.volume_decimals, PRESET_BCD_WIDTH)?,
                ))
            },
            (None, Some(a)) => {
                if a <= 0.0 {
                    return Err(LinkError::invalid_input("preset amount must be positive"));
                }
                Some(Record::new(
                    TRANS_PRESET_AMOUNT,
                    bcd::encode(a, self.config.amount_decimals, PRESET_BCD_WIDTH)?,
                ))
            },
            (None, None) => None,
        };

        let address = self.address_of(pump)?;
        info!(
            "authorize pump {} (volume={:?}, amount={:?})",
            pump, volume, amount
        );

        if let Some(record) = preset {
            self.transact_at(address, &[record]).await?;
            // The controller needs a beat to latch the preset before the
            // authorize command arrives.
            sleep(self.config.preset_settle()).await;
        }

        self.exchange(address, &[Record::command(PumpCommand::Authorize)])
            .await
    }

    /// Stop the running fill.
    pub async fn stop(&self, pump: u8) -> Result<Telemetry> {
        self.command(pump, PumpCommand::Stop).await
    }

    /// Return the pump to its idle state.
    pub async fn reset(&self, pump: u8) -> Result<Telemetry> {
        self.command(pump, PumpCommand::Reset).await
    }

    /// Switch the pump off.
    pub async fn switch_off(&self, pump: u8) -> Result<Telemetry> {
        self.command(pump, PumpCommand::SwitchOff).await
    }

    /// Suspend filling on one nozzle, or the whole pump with nozzle 0.
    pub async fn suspend(&self, pump: u8, nozzle: u8) -> Result<Telemetry> {
        if nozzle != 0 {
            self.check_nozzle(nozzle)?;
        }
        let address = self.address_of(pump)?;
        self.command_then_status(address, Record::new(TRANS_SUSPEND, vec![nozzle]))
            .await
    }

    /// Resume filling on one nozzle, or the whole pump with nozzle 0.
    pub async fn resume(&self, pump: u8, nozzle: u8) -> Result<Telemetry> {
        if nozzle != 0 {
            self.check_nozzle(nozzle)?;
        }
        let address = self.address_of(pump)?;
        self.command_then_status(address, Record::new(TRANS_RESUME, vec![nozzle]))
            .await
    }

    /// Load a new price table.
    ///
    /// The table always covers every addressable nozzle in nozzle order;
    /// nozzles missing from `prices` are priced zero.
    pub async fn update_price(&self, pump: u8, prices: &HashMap<u8, f64>) -> Result<Telemetry> {
        for (&nozzle, &price) in prices {
            self.check_nozzle(nozzle)?;
            if price <= 0.0 {
                return Err(LinkError::invalid_input(format!(
                    "price for nozzle {} must be positive",
                    nozzle
                )));
            }
        }

        let mut table =
            Vec::with_capacity(usize::from(self.config.nozzle_count) * PRICE_BCD_WIDTH);
        for nozzle in 1..=self.config.nozzle_count {
            let price = prices.get(&nozzle).copied().unwrap_or(0.0);
            table.extend_from_slice(&bcd::encode(
                price,
                self.config.price_decimals,
                PRICE_BCD_WIDTH,
            )?);
        }

        let address = self.address_of(pump)?;
        info!("price update for pump {}: {} entries", pump, self.config.nozzle_count);
        self.command_then_status(address, Record::new(TRANS_PRICE_UPDATE, table))
            .await
    }

    /// Restrict the pump to the listed nozzles.
    pub async fn allow_nozzles(&self, pump: u8, nozzles: &[u8]) -> Result<Telemetry> {
        if nozzles.is_empty() {
            return Err(LinkError::invalid_input("nozzle list is empty"));
        }
        for &nozzle in nozzles {
            self.check_nozzle(nozzle)?;
        }

        let address = self.address_of(pump)?;
        self.command_then_status(address, Record::new(TRANS_ALLOW_NOZZLES, nozzles.to_vec()))
            .await
    }
}
