use std::io::{self, Write};
use std::sync::OnceLock;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

/// Stderr logger. Stdout carries the line protocol, so everything
/// diagnostic goes to stderr.
struct Logger {
    level: LevelFilter,
}

impl Logger {
    fn is_app_target(target: &str) -> bool {
        target == "wolkanlin_core" || target.starts_with("wolkanlin_core::")
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && Self::is_app_target(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let line = format!(
            "{timestamp} [{level}] {message}\n",
            level = record.level(),
            message = record.args()
        );
        let _ = io::stderr().write_all(line.as_bytes());
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

fn level_from_env() -> LevelFilter {
    match std::env::var("WOLKANLIN_LOG").as_deref() {
        Ok("off") => LevelFilter::Off,
        Ok("error") => LevelFilter::Error,
        Ok("warn") => LevelFilter::Warn,
        Ok("debug") => LevelFilter::Debug,
        Ok("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

pub fn init() {
    let level = level_from_env();
    let logger = LOGGER.get_or_init(|| Logger { level });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}
