use jeflog::warn;
use tracing::{level_filters::LevelFilter, Level};
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::{SubscriberBuilder, format::{DefaultFields, Format}};

pub const LOG_DIRECTORY: &str = "log";

pub fn file_logger(log_name: &str) -> SubscriberBuilder<DefaultFields, Format, LevelFilter, RollingFileAppender> {
    let file_appender = tracing_appender::rolling::never(LOG_DIRECTORY, log_name);
    tracing_subscriber::fmt()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
}

/// Sends tracing output to `log/<log_name>` when a name is given. Console
/// output goes through jeflog either way.
pub fn init(log_name: Option<&str>) {
    let Some(log_name) = log_name else {
        return;
    };

    if let Err(e) = file_logger(log_name).try_init() {
        warn!("Could not install file logger: {e}");
    }
}
