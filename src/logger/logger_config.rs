use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use once_cell::sync::OnceCell;

use crate::PostingError;

static LOG4RS_HANDLE: OnceCell<Handle> = OnceCell::new();

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l} [{T}] {t} - {m}{n}";
const LOG_FILE_NAME: &str = "posting_lookup.log";
const CRATE_TARGET: &str = "posting_lookup";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub log_directory: PathBuf,
    /// One of `error`, `warn`, `info`, `debug`, `trace` or `off`.
    pub log_level: String,
    pub log_in_file: bool,
    pub console_display: bool,
    /// Drop records whose target is outside this crate.
    pub only_record_crate: bool,
}

impl LoggerConfig {
    pub fn new(
        log_directory: impl Into<PathBuf>,
        log_level: impl Into<String>,
        log_in_file: bool,
        console_display: bool,
        only_record_crate: bool,
    ) -> Self {
        LoggerConfig {
            log_directory: log_directory.into(),
            log_level: log_level.into(),
            log_in_file,
            console_display,
            only_record_crate,
        }
    }

    pub fn level(&self) -> crate::Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| PostingError::LoggerError(format!("unknown log level `{}`", self.log_level)))
    }

    pub fn build_logger_config(&self) -> crate::Result<Config> {
        let level = self.level()?;
        let mut builder = Config::builder();
        let mut appenders = Vec::new();

        if self.console_display {
            let console = ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(LOG_PATTERN))).build();
            builder = builder.appender(Appender::builder().build("console", Box::new(console)));
            appenders.push("console");
        }
        if self.log_in_file {
            let file = FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build(self.log_directory.join(LOG_FILE_NAME))
                .map_err(|e| PostingError::LoggerError(format!("can't open log file: {e}")))?;
            builder = builder.appender(Appender::builder().build("file", Box::new(file)));
            appenders.push("file");
        }

        let config = if self.only_record_crate {
            let logger = Logger::builder().appenders(appenders).additive(false).build(CRATE_TARGET, level);
            builder.logger(logger).build(Root::builder().build(LevelFilter::Off))
        } else {
            builder.build(Root::builder().appenders(appenders).build(level))
        };
        config.map_err(|e| PostingError::LoggerError(e.to_string()))
    }

    /// Installs the configuration, or swaps it in when a logger from an
    /// earlier call is already running.
    pub fn init(&self) -> crate::Result<()> {
        let mut installed = false;
        let handle = LOG4RS_HANDLE.get_or_try_init(|| {
            installed = true;
            let config = self.build_logger_config()?;
            log4rs::init_config(config).map_err(|e| PostingError::LoggerError(e.to_string()))
        })?;
        if !installed {
            handle.set_config(self.build_logger_config()?);
        }
        Ok(())
    }
}
