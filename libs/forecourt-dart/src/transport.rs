//! Serial bus adapter
//!
//! `BusLink` implementation over an RS-485 serial line via `tokio-serial`.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, info};

use forecourt_link::{BusLink, LinkError, Result};

use crate::config::SerialConfig;

/// One RS-485 line carrying the pump multidrop bus.
#[derive(Debug)]
pub struct SerialLink {
    port: SerialStream,
}

impl SerialLink {
    /// Open the serial device described by `config`.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!(
            "opening {} @{}baud {}{}{}",
            config.device,
            config.baud_rate,
            config.data_bits,
            config.parity.chars().next().unwrap_or('n').to_ascii_uppercase(),
            config.stop_bits
        );

        match tokio_serial::new(&config.device, config.baud_rate)
            .data_bits(data_bits_from(config.data_bits))
            .parity(parity_from(&config.parity))
            .stop_bits(stop_bits_from(config.stop_bits))
            .open_native_async()
        {
            Ok(port) => {
                info!("serial port {} opened", config.device);
                Ok(Self { port })
            },
            Err(e) => {
                error!("serial open err: {} - {}", config.device, e);
                Err(LinkError::io(format!(
                    "failed to open serial port {}: {e}",
                    config.device
                )))
            },
        }
    }
}

fn parity_from(parity: &str) -> tokio_serial::Parity {
    match parity.to_ascii_lowercase().as_str() {
        "even" => tokio_serial::Parity::Even,
        "odd" => tokio_serial::Parity::Odd,
        _ => tokio_serial::Parity::None,
    }
}

fn data_bits_from(data_bits: u8) -> tokio_serial::DataBits {
    match data_bits {
        5 => tokio_serial::DataBits::Five,
        6 => tokio_serial::DataBits::Six,
        7 => tokio_serial::DataBits::Seven,
        _ => tokio_serial::DataBits::Eight,
    }
}

fn stop_bits_from(stop_bits: u8) -> tokio_serial::StopBits {
    match stop_bits {
        2 => tokio_serial::StopBits::Two,
        _ => tokio_serial::StopBits::One,
    }
}

#[async_trait]
impl BusLink for SerialLink {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data).await.map_err(|e| {
            error!("serial TX: {}", e);
            LinkError::io(format!("serial write error: {e}"))
        })?;
        self.port.flush().await.map_err(|e| {
            error!("serial flush: {}", e);
            LinkError::io(format!("serial flush error: {e}"))
        })?;
        debug!("serial TX: {}B", data.len());
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let bytes = self.port.read(buf).await.map_err(|e| {
            error!("serial RX: {}", e);
            LinkError::io(format!("serial read error: {e}"))
        })?;
        if bytes == 0 {
            error!("serial closed");
            return Err(LinkError::io("serial port closed"));
        }
        Ok(bytes)
    }

    async fn discard_input(&mut self) -> Result<()> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|e| LinkError::io(format!("failed to discard serial input: {e}")))
    }
}
