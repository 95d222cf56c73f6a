//! Provides a driver for a Microchip MCP3208 ADC via the `embedded-hal` ecosystem.
//!
//! The wire format is exposed as plain functions ([`command_frame`], [`decode_sample`])
//! so callers that own a raw byte transport can speak the protocol without a driver.

#![no_std]
#![forbid(unsafe_code)]

use embedded_hal::spi::SpiDevice;

pub mod mcp3208;

/// Number of bytes exchanged per conversion.
pub const FRAME_LEN: usize = 3;

/// Largest value a 12 bit conversion can produce.
pub const MAX_SAMPLE: u16 = 0x0FFF;

/// Builds the command frame selecting `channel`. Only the low 3 bits of `channel` are used.
///
/// ```text
/// byte0: 0 0 0 0 0 START SGL/DIFF D2
/// byte1: D1 D0 x x x x x x
/// byte2: x x x x x x x x
/// ```
pub const fn command_frame(channel: u8, single_ended: bool) -> [u8; FRAME_LEN] {
    let mode = if single_ended {
        0b0000_0010
    } else {
        0b0000_0000
    };

    let start = 0b0000_0100;

    [
        start | mode | ((channel & 0b100) >> 2),
        (channel & 0b011) << 6,
        0b0000_0000,
    ]
}

/// Recovers the channel bits encoded in a command frame.
pub const fn frame_channel(frame: &[u8; FRAME_LEN]) -> u8 {
    ((frame[0] & 0b0000_0001) << 2) | (frame[1] >> 6)
}

/// Extracts the 12 bit conversion result from a response frame.
///
/// The first byte is clocked out while the device is still receiving the command and is discarded.
pub const fn decode_sample(response: &[u8; FRAME_LEN]) -> u16 {
    let result = u16::from_be_bytes([response[1], response[2]]);

    result & MAX_SAMPLE
}

/// Internal method for reading/writing to an MCP3208. Channel must be valid for the intended chip.
pub(crate) fn read_with_mode<SPI: SpiDevice>(
    spi: &mut SPI,
    channel: u8,
    single_ended: bool,
) -> Result<u16, SPI::Error> {
    let mut buffer = command_frame(channel, single_ended);

    spi.transfer_in_place(&mut buffer)?;

    Ok(decode_sample(&buffer))
}
