use bson::{Bson, Document};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use profile_explain::config::Config;
use profile_explain::services::RecordReader;
use profile_explain::services::explain::{Reconstructor, extract};

fn main() -> Result<(), anyhow::Error> {
    // Load configuration first
    let config = Config::load()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _guard = init_logging(&config);
    config.log_notices();

    tracing::info!("profile-explain starting up");

    let records = match &config.input.path {
        Some(path) => RecordReader::read_path(Path::new(path))?,
        None => RecordReader::read_from(io::stdin().lock())?,
    };
    tracing::info!("Loaded {} profiler records", records.len());

    let reconstructor = Reconstructor::new();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0usize;
    let mut skipped = 0usize;

    for (i, record) in records.iter().enumerate() {
        let result = reconstructor.reconstruct(&extract(record));
        if result.is_lossy() {
            let reasons: Vec<String> =
                result.approximations.iter().map(ToString::to_string).collect();
            if config.output.skip_lossy {
                tracing::info!("Skipping record {} ({}): {}", i + 1, record.ns, reasons.join(", "));
                skipped += 1;
                continue;
            }
            tracing::warn!("Record {} ({}) approximated: {}", i + 1, record.ns, reasons.join(", "));
        }
        write_command(&mut out, result.command, config.output.pretty)?;
        written += 1;
    }
    out.flush()?;

    tracing::info!("Wrote {} explain commands, skipped {}", written, skipped);
    Ok(())
}

fn init_logging(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);
    let registry = tracing_subscriber::registry().with(log_filter);

    // Add file logging if configured
    if let Some(log_file) = &config.logging.file {
        let (log_dir, file_prefix) = log_file_target(log_file);
        let dir_warning = create_log_dir(&log_dir);

        let file_appender = tracing_appender::rolling::daily(&log_dir, &file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();

        // Reported only now that a subscriber is listening
        if let Some(warning) = dir_warning {
            tracing::warn!("{}", warning);
        }
        Some(guard)
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(io::stderr)).init();
        None
    }
}

/// Directory and file prefix for the daily rolling log
fn log_file_target(log_file: &str) -> (PathBuf, String) {
    let log_path = Path::new(log_file);
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("profile-explain.log");
    // Rolling appender adds the date suffix itself
    let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);
    (log_dir, file_prefix.to_string())
}

/// Create the log directory, returning a warning when that fails
fn create_log_dir(dir: &Path) -> Option<String> {
    std::fs::create_dir_all(dir)
        .err()
        .map(|e| format!("Failed to create log directory {}: {}", dir.display(), e))
}

fn write_command<W: Write>(out: &mut W, command: Document, pretty: bool) -> io::Result<()> {
    let json = Bson::Document(command).into_relaxed_extjson();
    if pretty {
        serde_json::to_writer_pretty(&mut *out, &json)?;
    } else {
        serde_json::to_writer(&mut *out, &json)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_target_splits_dir_and_prefix() {
        let (dir, prefix) = log_file_target("logs/app/profile-explain.log");
        assert_eq!(dir, PathBuf::from("logs/app"));
        assert_eq!(prefix, "profile-explain");
    }

    #[test]
    fn test_log_file_target_bare_name_defaults_dir() {
        let (dir, prefix) = log_file_target("run.txt");
        assert_eq!(dir, PathBuf::from("logs"));
        assert_eq!(prefix, "run.txt");
    }

    #[test]
    fn test_create_log_dir_reports_failure() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let log_file = file.path().join("nested/profile-explain.log");
        let (dir, _) = log_file_target(log_file.to_str().unwrap());

        // Parent is a regular file, so the directory cannot be created
        let warning = create_log_dir(&dir).unwrap();
        assert!(warning.starts_with("Failed to create log directory"));
        assert!(warning.contains("nested"));
    }

    #[test]
    fn test_create_log_dir_succeeds_quietly() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("logs/app");
        assert_eq!(create_log_dir(&dir), None);
        assert!(dir.is_dir());
    }
}
