use std::fs;
use std::path::Path;

use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "ovirt-platform.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Level from a `RUST_LOG`-style value; unset or unparsable values mean `info`.
fn level_filter(value: Option<&str>) -> LevelFilter {
    value.and_then(|v| v.parse().ok()).unwrap_or(LevelFilter::Info)
}

/// Installs the global logger: colored output on stderr plus `logs/ovirt-platform.log`.
///
/// Call once from `main`. The level comes from `RUST_LOG`. HTTP client crates stay at `warn`.
pub fn init() {
    let level = level_filter(std::env::var("RUST_LOG").ok().as_deref());
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let stderr = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format(TIMESTAMP_FORMAT),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = Dispatch::new()
        .level(level)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .chain(stderr);

    let log_path = Path::new(LOG_DIR).join(LOG_FILE);
    let log_file = fs::create_dir_all(LOG_DIR).and_then(|_| fern::log_file(&log_path));
    match log_file {
        Ok(file) => {
            dispatch = dispatch.chain(
                Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIMESTAMP_FORMAT), record.level(), record.target(), message))
                    })
                    .chain(file),
            );
        }
        Err(e) => eprintln!("Logging to stderr only, cannot open '{}': {}", log_path.display(), e),
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("Logger already initialized: {}", e);
        return;
    }
    log::debug!("Logging at {} to stderr and '{}'", level, log_path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(None), LevelFilter::Info);
        assert_eq!(level_filter(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_filter(Some("WARN")), LevelFilter::Warn);
        assert_eq!(level_filter(Some("chatty")), LevelFilter::Info);
    }
}
