use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime};
use env_logger::Builder;
use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const LOG_DIR: &str = "logs";
const RETENTION_DAYS: i64 = 7;

static LOG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^deploy-(\d{8}-\d{6})\.log$").unwrap());

/// Log backend that appends every record to the invocation's log file and
/// mirrors records at or above the console threshold to stderr.
///
/// The console half is a regular `env_logger` logger so filtering and
/// formatting stay consistent with its conventions. The file half records
/// everything down to DEBUG regardless of the console threshold. The mutex
/// exists only because `log::Log` demands `Sync`; orchestration itself is
/// single-threaded.
struct TeeLogger {
    file: Mutex<File>,
    console: env_logger::Logger,
}

impl Log for TeeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "{} [{}] {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );
        }

        if self.console.matches(record) {
            self.console.log(record);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
        self.console.flush();
    }
}

/// Create the log directory and this invocation's log file, prune stale
/// logs, and install the process-wide logger. Returns the log file path.
pub fn init(verbose: bool) -> Result<PathBuf> {
    init_at(Path::new(LOG_DIR), verbose)
}

fn init_at(dir: &Path, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("deploy-{}.log", stamp));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    prune_old_logs(dir, &path);

    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let console = Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(console_level)
        .build();

    log::set_boxed_logger(Box::new(TeeLogger {
        file: Mutex::new(file),
        console,
    }))
    .map_err(|e| anyhow!("Failed to install logger: {}", e))?;
    log::set_max_level(LevelFilter::Debug);

    Ok(path)
}

/// Remove log files older than the retention window. Best-effort: every
/// failure is ignored, and the active log file is never touched.
fn prune_old_logs(dir: &Path, active: &Path) {
    let cutoff = Local::now().naive_local() - chrono::Duration::days(RETENTION_DAYS);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path == active {
            continue;
        }
        let stamp = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_log_stamp);
        if let Some(stamp) = stamp {
            if stamp < cutoff {
                let _ = fs::remove_file(&path);
            }
        }
    }
}

/// Extract the invocation timestamp from a log file name, or None for
/// files this tool did not create.
fn parse_log_stamp(name: &str) -> Option<NaiveDateTime> {
    let caps = LOG_NAME_RE.captures(name)?;
    NaiveDateTime::parse_from_str(&caps[1], "%Y%m%d-%H%M%S").ok()
}
