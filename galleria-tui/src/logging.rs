//! tracing setup. The interactive browser owns the terminal, so it logs to a
//! file under the state dir; headless commands log to stderr.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GALLERIA_LOG";

pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// `-v` count wins over the settings file; with neither, only warnings show.
pub fn level_for(verbose: u8, configured: Option<&str>) -> String {
    match verbose {
        0 => configured.unwrap_or("warn").to_string(),
        1 => "info".into(),
        2 => "debug".into(),
        _ => "trace".into(),
    }
}

pub fn init_logging(level: &str, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    }
    .map_err(|e| anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(level_for(0, None), "warn");
        assert_eq!(level_for(0, Some("galleria_core=debug")), "galleria_core=debug");
        assert_eq!(level_for(1, Some("error")), "info");
        assert_eq!(level_for(2, None), "debug");
        assert_eq!(level_for(7, None), "trace");
    }
}
