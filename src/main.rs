use clap::Parser;
use jeflog::{fail, pass};
use padlink::{
    config::Config,
    dispatcher::Dispatcher,
    input::{gamepad::Gamepads, sampler::{InputMapping, Sampler}},
    logger,
    registry::Registry,
    scheduler::Scheduler,
    shell,
    state::SharedState,
    Result,
};
use std::{path::PathBuf, process, sync::Arc};

/// Relays a gamepad button to robots over UDP.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON configuration file. Built-in defaults are used without one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default UDP port for robots that do not set their own.
    #[arg(long)]
    port: Option<u16>,

    /// Sampling period in milliseconds.
    #[arg(long)]
    sample_ms: Option<u64>,

    /// Heartbeat rate in messages per second.
    #[arg(long)]
    send_hz: Option<f64>,

    /// Id of the robot driven by the button.
    #[arg(long)]
    controlled: Option<u32>,

    /// Fixed button index, disables auto-learning.
    #[arg(long)]
    button: Option<usize>,

    /// Write diagnostics to log/<FILE>.
    #[arg(long, value_name = "FILE")]
    log_file: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(sample_ms) = self.sample_ms {
            config.sample_period_ms = sample_ms;
        }

        if let Some(send_hz) = self.send_hz {
            config.send_hz = send_hz;
        }

        if let Some(controlled) = self.controlled {
            config.controlled = controlled;
        }

        if self.button.is_some() {
            config.button = self.button;
        }

        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }

        config.validate()?;
        Ok(config)
    }
}

fn start(config: Config) -> Result<()> {
    logger::init(config.log_file.as_deref());

    let registry = Registry::from_config(&config)?;
    let target = registry.resolve(config.controlled)?;
    let dispatcher = Arc::new(Dispatcher::new(registry)?);
    let shared = SharedState::new();

    let mapping = match config.button {
        Some(index) => InputMapping::forced(index),
        None => InputMapping::unlearned(),
    };

    let sampler = Sampler::new(Gamepads::new(), mapping, config.retry_interval(), shared.clone());
    let mut scheduler = Scheduler::new(sampler, dispatcher.clone(), config.controlled, config.sample_period(), config.send_period());

    pass!("Sending to: {target} (robot {}) at {} Hz.", config.controlled, config.send_hz);
    shell::spawn(dispatcher, shared);

    scheduler.run()
}

fn main() {
    let result = Args::parse()
        .into_config()
        .and_then(start);

    if let Err(e) = result {
        fail!("{e}");
        process::exit(1);
    }
}
