use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::error::{Error, Result};

pub const DEFAULT_ROBOT_HOST: &str = "192.168.137.207";
pub const DEFAULT_ROBOT_PORT: u16 = 4210;
pub const DEFAULT_ROBOT_ID: u32 = 1;

/// One robot as written in the configuration file. `port` falls back to
/// [`Config::port`] when omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotEntry {
    pub id: u32,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Static settings, read once at startup and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub robots: Vec<RobotEntry>,
    pub port: u16,
    pub sample_period_ms: u64,
    pub send_hz: f64,
    pub controlled: u32,
    pub button: Option<usize>,
    pub retry_ms: u64,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            robots: vec![RobotEntry {
                id: DEFAULT_ROBOT_ID,
                host: DEFAULT_ROBOT_HOST.to_string(),
                port: None,
            }],
            port: DEFAULT_ROBOT_PORT,
            sample_period_ms: 20,
            send_hz: 30.0,
            controlled: DEFAULT_ROBOT_ID,
            button: None,
            retry_ms: 500,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Config> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a file without validating it, so command line overrides can be
    /// applied first. Call [`Config::validate`] afterwards.
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Rejects anything that would only surface later as a runtime fault.
    pub fn validate(&self) -> Result<()> {
        if self.robots.is_empty() {
            return Err(Error::Config("at least one robot must be configured".to_string()));
        }

        let mut seen = Vec::with_capacity(self.robots.len());
        for robot in &self.robots {
            if robot.id == 0 {
                return Err(Error::Config("robot ids must be positive".to_string()));
            }

            if seen.contains(&robot.id) {
                return Err(Error::DuplicateTarget(robot.id));
            }

            seen.push(robot.id);
        }

        if !seen.contains(&self.controlled) {
            return Err(Error::Config(format!("controlled robot {} is not in the robot table", self.controlled)));
        }

        if !(self.send_hz.is_finite() && self.send_hz > 0.0) {
            return Err(Error::Config(format!("send rate must be positive, got {}", self.send_hz)));
        }

        if Duration::try_from_secs_f64(1.0 / self.send_hz).is_err() {
            return Err(Error::Config(format!("send rate {} is too low", self.send_hz)));
        }

        if self.sample_period_ms == 0 {
            return Err(Error::Config("sample period must be positive".to_string()));
        }

        Ok(())
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn send_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.send_hz)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    pub fn port_of(&self, robot: &RobotEntry) -> u16 {
        robot.port.unwrap_or(self.port)
    }
}
