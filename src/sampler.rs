use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use mcp3208::{command_frame, decode_sample};

use crate::config::SpiConfig;
use crate::error::{SamplerError, Unavailable};
use crate::transport::Transport;

/// Number of analog inputs on the MCP3208.
pub const CHANNELS: u8 = 8;

/// Something that can take a conversion from an MCP3208 channel.
///
/// Every read is a blocking request-response cycle with no dependency on earlier reads.
pub trait Adc: Send + Sync {
    /// Converts `channel`, single-ended when `single_ended` is `true`, pseudo-differential otherwise.
    fn read_with_mode(&self, channel: i32, single_ended: bool) -> Result<u16, SamplerError>;

    /// Converts `channel` in single-ended mode, returning a value in `0..=4095`.
    fn read(&self, channel: i32) -> Result<u16, SamplerError> {
        self.read_with_mode(channel, true)
    }

    fn read_differential(&self, channel: i32) -> Result<u16, SamplerError> {
        self.read_with_mode(channel, false)
    }

    /// Releases the bus. Later reads fail with [`SamplerError::TransportUnavailable`].
    fn close(&self);

    fn is_open(&self) -> bool;
}

pub(crate) fn validate_channel(channel: i32) -> Result<u8, SamplerError> {
    if channel < 0 || channel > (CHANNELS - 1) as i32 {
        return Err(SamplerError::ChannelOutOfRange(channel));
    }

    Ok(channel as u8)
}

/// Speaks the MCP3208 protocol over a raw [`Transport`].
pub struct Sampler<T> {
    handle: Mutex<Option<T>>,
}

impl<T: Transport> Sampler<T> {
    /// Takes ownership of an already open transport.
    pub fn new(transport: T) -> Self {
        Self {
            handle: Mutex::new(Some(transport)),
        }
    }

    /// Opens the transport described by `config`.
    pub fn open(config: &SpiConfig) -> Result<Self, SamplerError> {
        config.validate()?;

        let transport = T::open(config).map_err(|source| {
            SamplerError::TransportUnavailable(Unavailable::Open {
                bus: config.bus,
                device: config.device,
                source: Box::new(source),
            })
        })?;

        debug!(
            "opened SPI bus {} device {} at {} Hz",
            config.bus, config.device, config.speed_hz
        );

        Ok(Self::new(transport))
    }

    fn handle(&self) -> MutexGuard<'_, Option<T>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Transport> Adc for Sampler<T> {
    fn read_with_mode(&self, channel: i32, single_ended: bool) -> Result<u16, SamplerError> {
        let index = validate_channel(channel)?;

        let mut handle = self.handle();
        let transport = handle.as_mut().ok_or_else(SamplerError::closed)?;

        let command = command_frame(index, single_ended);

        let response = transport.transfer(&command).map_err(|err| {
            warn!("transfer on channel {index} failed: {err}");
            SamplerError::transfer(err)
        })?;

        let sample = decode_sample(&response);

        debug!("channel {index}: {command:02x?} -> {response:02x?} = {sample}");

        Ok(sample)
    }

    fn close(&self) {
        if self.handle().take().is_some() {
            debug!("closed SPI transport");
        }
    }

    fn is_open(&self) -> bool {
        self.handle().is_some()
    }
}
