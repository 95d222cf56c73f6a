//! Reads 12 bit samples from a Microchip MCP3208 ADC over SPI.
//!
//! Two interchangeable backends implement [`Adc`]: [`Sampler`] speaks the wire protocol over any
//! byte [`Transport`], and [`HalSampler`] drives the `mcp3208` `embedded-hal` driver.

pub mod config;
pub mod error;
pub mod hal;
pub mod opts;
pub mod sampler;
pub mod transport;

#[cfg(feature = "raspberry_pi")]
pub mod raspberry_pi;

pub use config::{Backend, SamplerConfig, SpiConfig};
pub use error::{SamplerError, Unavailable};
pub use hal::HalSampler;
pub use sampler::{Adc, Sampler, CHANNELS};
pub use transport::Transport;
