//! The byte-exchange contract a [`Sampler`](crate::Sampler) runs the protocol over.

use mcp3208::FRAME_LEN;

use crate::config::SpiConfig;

/// A synchronous, full-duplex SPI connection to one chip-select line.
///
/// The connection is closed when the value is dropped.
pub trait Transport: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Opens the bus and chip-select line named by `config` and applies its clock speed, mode and bit order.
    fn open(config: &SpiConfig) -> Result<Self, Self::Error>
    where
        Self: Sized;

    /// Clocks `command` out while clocking the same number of bytes in. Blocks until the exchange is done.
    fn transfer(&mut self, command: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], Self::Error>;
}
