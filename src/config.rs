//! Bus and backend configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// SPI clock polarity and phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum SpiMode {
    /// CPOL 0, CPHA 0
    #[default]
    Mode0,
    /// CPOL 0, CPHA 1
    Mode1,
    /// CPOL 1, CPHA 0
    Mode2,
    /// CPOL 1, CPHA 1
    Mode3,
}

/// Order bits are shifted out on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

/// How a sampler talks to the converter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Raw full-duplex transfers through the kernel spidev interface.
    #[default]
    Spidev,
    /// The `embedded-hal` driver, with a GPIO pin as chip select.
    Hal,
}

/// Which bus and chip-select line to open, and how to clock it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpiConfig {
    pub bus: u8,
    /// Chip-select line, CE0 (GPIO8) or CE1 (GPIO7) on a Raspberry Pi.
    pub device: u8,
    /// Upper bound on the clock rate in Hz.
    pub speed_hz: u32,
    pub mode: SpiMode,
    pub bit_order: BitOrder,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            device: 0,
            speed_hz: 1_000_000,
            mode: SpiMode::Mode0,
            bit_order: BitOrder::MsbFirst,
        }
    }
}

impl SpiConfig {
    pub fn new(bus: u8, device: u8, speed_hz: u32) -> Self {
        Self {
            bus,
            device,
            speed_hz,
            ..Self::default()
        }
    }

    /// Checks the settings against what the MCP3208 can talk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode != SpiMode::Mode0 {
            return Err(ConfigError::UnsupportedMode(self.mode));
        }

        if self.bit_order != BitOrder::MsbFirst {
            return Err(ConfigError::UnsupportedBitOrder);
        }

        if self.speed_hz == 0 {
            return Err(ConfigError::ZeroSpeed);
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub spi: SpiConfig,
    pub backend: Backend,
    /// BCM number of the GPIO driving chip select, used by [`Backend::Hal`].
    pub cs_pin: Option<u8>,
}

impl SamplerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;

        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spi.validate()?;

        if self.backend == Backend::Hal && self.cs_pin.is_none() {
            return Err(ConfigError::MissingChipSelect);
        }

        Ok(())
    }
}
