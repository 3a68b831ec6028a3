use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No input device is connected. Recoverable, the sampler retries.
    #[error("no input device found")]
    DeviceAbsent,

    #[error("could not read button {index} from the input device")]
    DeviceRead { index: usize },

    #[error("robot {0} is not registered")]
    UnknownTarget(u32),

    #[error("robot {0} is registered more than once")]
    DuplicateTarget(u32),

    #[error("failed to send datagram: {0}")]
    Transmission(#[source] io::Error),

    #[error("could not resolve host '{host}'")]
    Resolve { host: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("could not parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
