use colored::Colorize;
use log::Level;
use std::sync::OnceLock;

/// Terminal logger for dashboard tooling and tests.
///
/// Each record is printed as `file:line time LEVEL message`, colored per level.
#[derive(Clone)]
pub struct Logger {
  level: Level,
}

impl Logger {
  pub fn new(level: Level) -> Self {
    Logger { level }
  }

  fn format(&self, record: &log::Record) -> String {
    let time = chrono::Local::now()
      .format("%Y-%m-%d %H:%M:%S")
      .to_string()
      .magenta();

    let level = match record.level() {
      Level::Error => "ERROR".red(),
      Level::Warn => "WARN".yellow(),
      Level::Info => "INFO".green(),
      Level::Debug => "DEBUG".blue(),
      Level::Trace => "TRACE".dimmed(),
    };

    let prefix = match (record.file(), record.line()) {
      (Some(file), Some(line)) => format!("{}:{} ", file, line).cyan(),
      _ => String::new().normal(),
    };

    format!("{}{} {} {}", prefix, time, level, record.args())
  }
}

impl Default for Logger {
  fn default() -> Self {
    Logger::new(Level::Debug)
  }
}

impl log::Log for Logger {
  fn enabled(&self, metadata: &log::Metadata) -> bool {
    metadata.level() <= self.level
  }

  fn log(&self, record: &log::Record) {
    if !self.enabled(record.metadata()) {
      return;
    }

    println!("{}", self.format(record));
  }

  fn flush(&self) {}
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Installs the logger at debug level. Later calls are no-ops.
pub fn init_logger() {
  init_logger_with_level(Level::Debug);
}

/// Installs the logger at `level`. Only the first call in a process has an
/// effect; a logger installed by someone else is left in place.
pub fn init_logger_with_level(level: Level) {
  if LOGGER.get().is_some() {
    return;
  }

  let logger = LOGGER.get_or_init(|| Logger::new(level));
  if log::set_logger(logger).is_ok() {
    log::set_max_level(level.to_level_filter());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use log::{LevelFilter, Log};

  #[test]
  fn test_enabled_respects_level() {
    let logger = Logger::new(Level::Info);
    let info = log::Metadata::builder().level(Level::Info).build();
    let debug = log::Metadata::builder().level(Level::Debug).build();

    assert!(logger.enabled(&info));
    assert!(!logger.enabled(&debug));
  }

  #[test]
  fn test_format_contains_message() {
    colored::control::set_override(false);
    let logger = Logger::default();
    let line = logger.format(
      &log::Record::builder()
        .args(format_args!("distilled 3 calls"))
        .level(Level::Warn)
        .file(Some("distiller.rs"))
        .line(Some(12))
        .build(),
    );
    assert!(line.starts_with("distiller.rs:12 "));
    assert!(line.contains("WARN"));
    assert!(line.ends_with("distilled 3 calls"));
  }

  #[test]
  fn test_init_twice() {
    init_logger_with_level(Level::Trace);
    init_logger();
    log::info!("logger installed");
    assert_eq!(log::max_level(), LevelFilter::Trace);
  }
}
