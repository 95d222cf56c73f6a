//! SPI transport and backend selection for a Raspberry Pi, via `rppal`.

use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use log::debug;
use mcp3208::FRAME_LEN;
use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{BitOrder, Bus, Mode, SlaveSelect, Spi};
use thiserror::Error;

use crate::config::{Backend, SamplerConfig, SpiConfig};
use crate::error::{BoxError, ConfigError, SamplerError, Unavailable};
use crate::hal::HalSampler;
use crate::sampler::{Adc, Sampler};
use crate::transport::Transport;

/// The `embedded-hal` device handed to the driver backend.
pub type HalDevice = ExclusiveDevice<Spi, OutputPin, NoDelay>;

#[derive(Debug, Error)]
pub enum RppalError {
    #[error(transparent)]
    Spi(#[from] rppal::spi::Error),
    #[error("no SPI bus {0}")]
    UnknownBus(u8),
    #[error("no chip-select line {0}")]
    UnknownDevice(u8),
    #[error("transferred {0} of {FRAME_LEN} bytes")]
    ShortTransfer(usize),
}

/// A kernel spidev handle.
pub struct RppalTransport {
    spi: Spi,
}

impl RppalTransport {
    pub fn into_inner(self) -> Spi {
        self.spi
    }
}

fn bus(index: u8) -> Option<Bus> {
    Some(match index {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        _ => return None,
    })
}

fn slave_select(index: u8) -> Option<SlaveSelect> {
    Some(match index {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        3 => SlaveSelect::Ss3,
        4 => SlaveSelect::Ss4,
        5 => SlaveSelect::Ss5,
        6 => SlaveSelect::Ss6,
        7 => SlaveSelect::Ss7,
        8 => SlaveSelect::Ss8,
        9 => SlaveSelect::Ss9,
        10 => SlaveSelect::Ss10,
        11 => SlaveSelect::Ss11,
        12 => SlaveSelect::Ss12,
        13 => SlaveSelect::Ss13,
        14 => SlaveSelect::Ss14,
        15 => SlaveSelect::Ss15,
        _ => return None,
    })
}

impl Transport for RppalTransport {
    type Error = RppalError;

    fn open(config: &SpiConfig) -> Result<Self, Self::Error> {
        let bus = bus(config.bus).ok_or(RppalError::UnknownBus(config.bus))?;
        let slave_select =
            slave_select(config.device).ok_or(RppalError::UnknownDevice(config.device))?;

        // The MCP3208 only talks mode 0, which `SpiConfig::validate` enforces.
        let spi = Spi::new(bus, slave_select, config.speed_hz, Mode::Mode0)?;

        spi.set_bit_order(BitOrder::MsbFirst)?;

        Ok(Self { spi })
    }

    fn transfer(&mut self, command: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], Self::Error> {
        let mut response = [0; FRAME_LEN];

        let transferred = self.spi.transfer(&mut response, command)?;

        if transferred != FRAME_LEN {
            return Err(RppalError::ShortTransfer(transferred));
        }

        Ok(response)
    }
}

/// Opens the driver backend: the spidev bus wrapped as an `embedded-hal` device, with a GPIO as chip select.
pub fn open_hal(config: &SamplerConfig) -> Result<HalSampler<HalDevice>, SamplerError> {
    config.validate()?;

    let cs_pin = config.cs_pin.ok_or(ConfigError::MissingChipSelect)?;

    let unavailable = |source: BoxError| {
        SamplerError::TransportUnavailable(Unavailable::Open {
            bus: config.spi.bus,
            device: config.spi.device,
            source,
        })
    };

    let spi = RppalTransport::open(&config.spi)
        .map_err(|err| unavailable(err.into()))?
        .into_inner();

    let cs = Gpio::new()
        .and_then(|gpio| gpio.get(cs_pin))
        .map_err(|err| unavailable(err.into()))?
        .into_output_high();

    debug!(
        "opened SPI bus {} with chip select on GPIO {cs_pin} at {} Hz",
        config.spi.bus, config.spi.speed_hz
    );

    Ok(HalSampler::new(ExclusiveDevice::new_no_delay(spi, cs)))
}

/// Opens the backend `config` asks for.
pub fn open(config: &SamplerConfig) -> Result<Box<dyn Adc>, SamplerError> {
    match config.backend {
        Backend::Spidev => Ok(Box::new(Sampler::<RppalTransport>::open(&config.spi)?)),
        Backend::Hal => Ok(Box::new(open_hal(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_indices() {
        assert_eq!(bus(0), Some(Bus::Spi0));
        assert_eq!(bus(7), None);
        assert_eq!(slave_select(1), Some(SlaveSelect::Ss1));
        assert_eq!(slave_select(16), None);
    }

    #[test]
    fn unknown_bus_is_rejected_before_touching_hardware() {
        let config = SpiConfig::new(9, 0, 1_000_000);

        assert!(matches!(RppalTransport::open(&config), Err(RppalError::UnknownBus(9))));
        assert!(matches!(
            Sampler::<RppalTransport>::open(&config),
            Err(SamplerError::TransportUnavailable(Unavailable::Open { bus: 9, .. }))
        ));
    }

    #[test]
    fn chip_select_pin_only_matters_to_the_hal_backend() {
        let spidev = SamplerConfig {
            spi: SpiConfig::new(9, 0, 1_000_000),
            backend: Backend::Spidev,
            cs_pin: None,
        };

        assert!(matches!(
            open(&spidev),
            Err(SamplerError::TransportUnavailable(Unavailable::Open { bus: 9, .. }))
        ));

        let hal = SamplerConfig {
            backend: Backend::Hal,
            ..spidev
        };

        assert!(matches!(
            open(&hal),
            Err(SamplerError::TransportUnavailable(Unavailable::Config(
                ConfigError::MissingChipSelect
            )))
        ));
    }
}
