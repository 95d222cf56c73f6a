//! Command line options of the `sample` binary.

use std::str::FromStr;
use std::time::Duration;

use getopts::Options;
use thiserror::Error;

use crate::config::{Backend, SamplerConfig};
use crate::error::ConfigError;
use crate::sampler::CHANNELS;

#[derive(Debug, Error)]
pub enum Error {
    /// User requested to see help, not run the program.
    #[error("{0}")]
    Help(String),
    #[error(transparent)]
    Cli(#[from] getopts::Fail),
    #[error("invalid value '{value}' for --{option}")]
    Invalid { option: &'static str, value: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, PartialEq)]
pub struct Configuration {
    pub sampler: SamplerConfig,
    /// Channels to read each round, in order.
    pub channels: Vec<i32>,
    /// Rounds to read, `None` to keep going.
    pub count: Option<u64>,
    pub interval: Duration,
    pub differential: bool,
}

fn create_options() -> Options {
    let mut opts = Options::new();
    opts.optopt("f", "config", "read settings from a JSON file", "FILE");
    opts.optopt("b", "bus", "SPI bus index (default 0)", "BUS");
    opts.optopt("d", "device", "chip-select line (default 0)", "DEVICE");
    opts.optopt("s", "speed", "maximum clock speed in Hz (default 1000000)", "HZ");
    opts.optopt("B", "backend", "spidev or hal (default spidev)", "BACKEND");
    opts.optopt("c", "cs-pin", "GPIO used as chip select by the hal backend", "PIN");
    opts.optopt("n", "count", "rounds to read, 0 for no limit (default 1)", "COUNT");
    opts.optopt("i", "interval", "pause between rounds in milliseconds (default 500)", "MS");
    opts.optflag("D", "differential", "read channel pairs in pseudo-differential mode");
    opts.optflag("h", "help", "show help");

    opts
}

fn parse_opt<T: FromStr>(
    matches: &getopts::Matches,
    option: &'static str,
) -> Result<Option<T>, Error> {
    matches
        .opt_str(option)
        .map(|value| value.parse().map_err(|_| Error::Invalid { option, value }))
        .transpose()
}

/// Parses `args`, the program name first.
pub fn parse(args: &[String]) -> Result<Configuration, Error> {
    let opts = create_options();

    let matches = opts.parse(args.get(1..).unwrap_or_default())?;

    if matches.opt_present("h") {
        let program = args.first().map(String::as_str).unwrap_or("sample");
        let brief = format!("Usage: {program} [ options ] [ channel ... ]");
        return Err(Error::Help(opts.usage(&brief)));
    }

    let mut sampler = match matches.opt_str("config") {
        Some(path) => SamplerConfig::from_json_file(path)?,
        None => SamplerConfig::default(),
    };

    if let Some(bus) = parse_opt::<u8>(&matches, "bus")? {
        sampler.spi.bus = bus;
    }
    if let Some(device) = parse_opt::<u8>(&matches, "device")? {
        sampler.spi.device = device;
    }
    if let Some(speed) = parse_opt::<u32>(&matches, "speed")? {
        sampler.spi.speed_hz = speed;
    }
    if let Some(pin) = parse_opt::<u8>(&matches, "cs-pin")? {
        sampler.cs_pin = Some(pin);
    }
    if let Some(backend) = matches.opt_str("backend") {
        sampler.backend = match backend.as_str() {
            "spidev" => Backend::Spidev,
            "hal" => Backend::Hal,
            _ => {
                return Err(Error::Invalid {
                    option: "backend",
                    value: backend,
                })
            }
        };
    }

    sampler.validate()?;

    let channels: Vec<i32> = if matches.free.is_empty() {
        (0..CHANNELS as i32).collect()
    } else {
        matches
            .free
            .iter()
            .map(|value| {
                value.parse().map_err(|_| Error::Invalid {
                    option: "channel",
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let count = match parse_opt::<u64>(&matches, "count")?.unwrap_or(1) {
        0 => None,
        count => Some(count),
    };

    let interval = Duration::from_millis(parse_opt::<u64>(&matches, "interval")?.unwrap_or(500));

    Ok(Configuration {
        sampler,
        channels,
        count,
        interval,
        differential: matches.opt_present("differential"),
    })
}
