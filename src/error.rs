//! Error taxonomy of the sampler.

use embedded_hal::spi::ErrorKind;
use thiserror::Error;

/// Type-erased transport error carried as the cause of a failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SamplerError {
    /// The requested channel is not one of the eight inputs. No transfer was attempted.
    #[error("MCP3208 channel must be 0-7: {0}")]
    ChannelOutOfRange(i32),
    /// The bus could not be opened, or the sampler was already closed.
    #[error("SPI transport unavailable")]
    TransportUnavailable(#[source] Unavailable),
    /// The transport failed mid-transaction.
    #[error("SPI transfer failed")]
    TransferFailed(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum Unavailable {
    #[error("failed to open SPI bus {bus} device {device}")]
    Open {
        bus: u8,
        device: u8,
        #[source]
        source: BoxError,
    },
    #[error("transport handle already closed")]
    Closed,
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the MCP3208 only supports SPI mode 0, got {0:?}")]
    UnsupportedMode(crate::config::SpiMode),
    #[error("the MCP3208 shifts data most significant bit first")]
    UnsupportedBitOrder,
    #[error("SPI clock speed must be non-zero")]
    ZeroSpeed,
    #[error("the hal backend needs a chip-select GPIO pin")]
    MissingChipSelect,
    #[error("couldn't read configuration file")]
    Read(#[from] std::io::Error),
    #[error("couldn't parse configuration file")]
    Parse(#[from] serde_json::Error),
}

/// An `embedded-hal` bus error, flattened so it can travel as a [`BoxError`].
#[derive(Debug, Error)]
#[error("SPI bus error ({kind}): {detail}")]
pub struct BusError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl BusError {
    pub fn new<E: embedded_hal::spi::Error>(err: E) -> Self {
        Self {
            kind: err.kind(),
            detail: format!("{err:?}"),
        }
    }
}

impl From<ConfigError> for SamplerError {
    fn from(err: ConfigError) -> Self {
        SamplerError::TransportUnavailable(err.into())
    }
}

impl SamplerError {
    pub(crate) fn closed() -> Self {
        SamplerError::TransportUnavailable(Unavailable::Closed)
    }

    pub(crate) fn transfer<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SamplerError::TransferFailed(Box::new(err))
    }
}
