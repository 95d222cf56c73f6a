use log::{error, info};
use sampler::opts::{self, Configuration};
use sampler::{Adc, SamplerError};

fn read_round(adc: &dyn Adc, config: &Configuration) -> Result<(), SamplerError> {
    for &channel in &config.channels {
        let data = if config.differential {
            adc.read_differential(channel)
        } else {
            adc.read(channel)
        };

        match data {
            Ok(data) => println!("Channel {channel}: {data}"),
            // A bad channel number doesn't stop the others from being read.
            Err(err @ SamplerError::ChannelOutOfRange(_)) => error!("{err}"),
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<_> = std::env::args().collect();

    let config = match opts::parse(&args) {
        Ok(config) => config,
        Err(opts::Error::Help(usage)) => {
            println!("{usage}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        "Sampling MCP3208 on SPI bus {} device {} via {:?}",
        config.sampler.spi.bus, config.sampler.spi.device, config.sampler.backend
    );

    let adc = sampler::raspberry_pi::open(&config.sampler)?;

    let mut round = 0;

    while config.count.map_or(true, |count| round < count) {
        if round > 0 {
            std::thread::sleep(config.interval);
        }

        read_round(adc.as_ref(), &config)?;

        round += 1;
    }

    adc.close();

    Ok(())
}
