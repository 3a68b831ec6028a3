pub mod config;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod logger;
pub mod registry;
pub mod scheduler;
pub mod shell;
pub mod state;

pub use error::{Error, Result};
