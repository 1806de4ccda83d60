//! Process-wide logger: every record goes to the log file and is echoed to
//! stderr.
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Env, Target};
use log::LevelFilter;

/// Environment variable holding the filter directives, e.g. `debug` or
/// `info,dxcompare_classifiers=debug`.
pub const LOG_ENV: &str = "DXCOMPARE_LOG";

/// Writes each buffer to the log file and to stderr.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stderr().flush()
    }
}

/// Flushes the logger when dropped, so the last records reach the file
/// before the process exits.
#[must_use = "logs may be lost if the guard is dropped early"]
pub struct LogGuard {
    _private: (),
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        log::logger().flush();
    }
}

/// Install the logger, appending to `log_file`. Only the first call in a
/// process installs it; later calls leave the existing logger in place.
pub fn init_logging(log_file: &Path) -> Result<LogGuard> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let installed = env_logger::Builder::default()
        .filter_level(LevelFilter::Info)
        .parse_env(Env::default().filter_or(LOG_ENV, "info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee { file })))
        .try_init();

    if installed.is_err() {
        log::debug!("Logger already initialised; keeping the existing one");
    }
    Ok(LogGuard { _private: () })
}
