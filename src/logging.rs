//! Diagnostic logging.
//!
//! The terminal belongs to the answer being drawn, so log lines go to a file
//! instead. `LOG_LEVEL` picks the verbosity.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Map a `LOG_LEVEL` value to a tracing level. Unknown or unset means info.
pub fn level_from(value: Option<&str>) -> LevelFilter {
    match value.map(str::trim) {
        Some("DEBUG") => LevelFilter::DEBUG,
        Some("INFO") => LevelFilter::INFO,
        Some("WARN") => LevelFilter::WARN,
        // tracing has nothing above error.
        Some("ERROR") | Some("FATAL") => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

fn filter_for(level: LevelFilter) -> EnvFilter {
    EnvFilter::new(format!("{},reqwest={}", level, level.min(LevelFilter::WARN)))
}

/// Send logs to `path`. Logging stays off when the file cannot be opened.
pub fn init(path: &Path) {
    let level = level_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref());

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels() {
        assert_eq!(level_from(Some("DEBUG")), LevelFilter::DEBUG);
        assert_eq!(level_from(Some("INFO")), LevelFilter::INFO);
        assert_eq!(level_from(Some("WARN")), LevelFilter::WARN);
        assert_eq!(level_from(Some("ERROR")), LevelFilter::ERROR);
        assert_eq!(level_from(Some("FATAL")), LevelFilter::ERROR);
    }

    #[test]
    fn test_unknown_or_unset_is_info() {
        assert_eq!(level_from(None), LevelFilter::INFO);
        assert_eq!(level_from(Some("verbose")), LevelFilter::INFO);
        assert_eq!(level_from(Some("debug")), LevelFilter::INFO);
    }

    #[test]
    fn test_reqwest_never_louder_than_warn() {
        let filter = filter_for(LevelFilter::DEBUG).to_string();
        assert!(filter.contains("reqwest=warn"));
    }
}
