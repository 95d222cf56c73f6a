use embedded_hal::spi::SpiDevice;

use crate::read_with_mode;

/// MCP3208 driver
pub struct Mcp3208<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mcp3208<SPI> {
    /// Creates a new driver from an SPI peripheral.
    /// Please ensure the SPI bus is in SPI mode 0, aka (0, 0), most significant bit first.
    pub fn new(spi: SPI) -> Self {
        spi.into()
    }

    /// Read a channel and return the 12 bit value as a [`u16`].
    /// If `single_ended` is `true`, the conversion will be completed in single-ended mode.
    /// If `false`, the conversion will instead use pseudo-differential mode.
    pub fn read_with_mode(&mut self, ch: Channel, single_ended: bool) -> Result<u16, SPI::Error> {
        read_with_mode(&mut self.spi, ch as u8, single_ended)
    }

    /// Read a channel and return the 12 bit value as a [`u16`] in single-ended mode.
    pub fn read(&mut self, ch: Channel) -> Result<u16, SPI::Error> {
        self.read_with_mode(ch, true)
    }

    /// Read a channel pair and return the 12 bit value as a [`u16`] in pseudo-differential mode.
    ///
    /// Even channels measure `CHn+` against `CHn+1`, odd channels the reverse.
    pub fn read_differential(&mut self, ch: Channel) -> Result<u16, SPI::Error> {
        self.read_with_mode(ch, false)
    }

    /// Gives the SPI peripheral back.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> From<SPI> for Mcp3208<SPI> {
    fn from(spi: SPI) -> Self {
        Self { spi }
    }
}

/// Channel list for MCP3208
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    CH0 = 0,
    CH1 = 1,
    CH2 = 2,
    CH3 = 3,
    CH4 = 4,
    CH5 = 5,
    CH6 = 6,
    CH7 = 7,
}

impl Channel {
    /// Looks up a channel by index, `None` past `CH7`.
    pub const fn new(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::CH0),
            1 => Some(Self::CH1),
            2 => Some(Self::CH2),
            3 => Some(Self::CH3),
            4 => Some(Self::CH4),
            5 => Some(Self::CH5),
            6 => Some(Self::CH6),
            7 => Some(Self::CH7),
            _ => None,
        }
    }

    /// Iterate over all channels.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::CH0,
            Self::CH1,
            Self::CH2,
            Self::CH3,
            Self::CH4,
            Self::CH5,
            Self::CH6,
            Self::CH7,
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_channel;
    use embedded_hal::spi::{Error, ErrorKind, ErrorType, Operation};

    #[derive(Debug, PartialEq)]
    struct MockError;

    impl Error for MockError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Answers every conversion with `1000 + channel`, or `4000 + channel` in differential mode.
    struct MockSpi;

    impl ErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            assert_eq!(operations.len(), 1);

            match &mut operations[0] {
                Operation::TransferInPlace(words) => {
                    assert_eq!(words.len(), 3);
                    assert_eq!(words[0] & 0b0000_0100, 0b0000_0100, "Missing start flag");
                    assert_eq!(words[2], 0, "Dummy byte must be zero");

                    let frame = [words[0], words[1], words[2]];
                    let base = if words[0] & 0b0000_0010 != 0 { 1000 } else { 4000 };
                    let value: u16 = base + frame_channel(&frame) as u16;

                    // Garbage in the high nibble must be masked off by the driver.
                    words[0] = 0xFF;
                    words[1] = 0xE0 | (value >> 8) as u8;
                    words[2] = value as u8;
                }
                _ => panic!("Not an expected operation"),
            }

            Ok(())
        }
    }

    struct FailingSpi;

    impl ErrorType for FailingSpi {
        type Error = MockError;
    }

    impl SpiDevice for FailingSpi {
        fn transaction(&mut self, _: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            Err(MockError)
        }
    }

    #[test]
    fn mock_spi() {
        let mut mcp = Mcp3208::new(MockSpi);

        for (index, channel) in Channel::all().enumerate() {
            assert_eq!(mcp.read(channel), Ok(1000 + index as u16));
        }
    }

    #[test]
    fn differential_mode() {
        let mut mcp = Mcp3208::new(MockSpi);

        assert_eq!(mcp.read_differential(Channel::CH6), Ok(4006));
    }

    #[test]
    fn bus_errors_are_returned() {
        let mut mcp = Mcp3208::new(FailingSpi);

        assert_eq!(mcp.read(Channel::CH0), Err(MockError));
    }

    #[test]
    fn channel_lookup() {
        assert_eq!(Channel::new(5), Some(Channel::CH5));
        assert_eq!(Channel::new(8), None);
        assert_eq!(Channel::all().count(), 8);
    }
}
