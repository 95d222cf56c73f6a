//! Sampling through the `embedded-hal` MCP3208 driver.

use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::spi::SpiDevice;
use log::{debug, warn};
use mcp3208::mcp3208::{Channel, Mcp3208};

use crate::error::{BusError, SamplerError};
use crate::sampler::{validate_channel, Adc};

/// An [`Adc`] backed by any `embedded-hal` [`SpiDevice`].
pub struct HalSampler<SPI> {
    driver: Mutex<Option<Mcp3208<SPI>>>,
}

impl<SPI: SpiDevice> HalSampler<SPI> {
    /// The device must already be in SPI mode 0, most significant bit first.
    pub fn new(spi: SPI) -> Self {
        Self {
            driver: Mutex::new(Some(Mcp3208::new(spi))),
        }
    }

    /// Closes the sampler and gives the SPI device back, if it was still open.
    pub fn release(&self) -> Option<SPI> {
        self.driver().take().map(Mcp3208::release)
    }

    fn driver(&self) -> MutexGuard<'_, Option<Mcp3208<SPI>>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<SPI> Adc for HalSampler<SPI>
where
    SPI: SpiDevice + Send,
{
    fn read_with_mode(&self, channel: i32, single_ended: bool) -> Result<u16, SamplerError> {
        let channel = validate_channel(channel)
            .ok()
            .and_then(Channel::new)
            .ok_or(SamplerError::ChannelOutOfRange(channel))?;

        let mut driver = self.driver();
        let driver = driver.as_mut().ok_or_else(SamplerError::closed)?;

        let sample = driver.read_with_mode(channel, single_ended).map_err(|err| {
            let err = BusError::new(err);
            warn!("transfer on {channel:?} failed: {err}");
            SamplerError::transfer(err)
        })?;

        debug!("{channel:?}: {sample}");

        Ok(sample)
    }

    fn close(&self) {
        if self.driver().take().is_some() {
            debug!("closed SPI device");
        }
    }

    fn is_open(&self) -> bool {
        self.driver().is_some()
    }
}
