use std::cmp::Reverse;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

use crate::config::TraceSettings;

const TRACE_SUFFIX: &str = ".trace.jsonl";

static TRACE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static ACTIVE_TRACE_FILE: OnceCell<PathBuf> = OnceCell::new();
static TRACING_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Snapshot of trace export state for diagnostics.
#[derive(Debug, Clone)]
pub struct TraceReport {
    pub enabled: bool,
    pub directory: Option<PathBuf>,
    pub active_file: Option<PathBuf>,
    pub recent_files: Vec<PathBuf>,
}

fn install_subscriber<S>(subscriber: S) -> Result<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    if TRACING_INITIALIZED.get().is_some() {
        return Ok(());
    }

    subscriber::set_global_default(subscriber)?;
    let _ = TRACING_INITIALIZED.set(());
    Ok(())
}

/// Install tracing subscriber with optional JSON trace export.
pub fn init_tracing(service: &str, verbose: bool, traces: &TraceSettings) -> Result<()> {
    let default_level = if verbose {
        "rasterbench=debug"
    } else {
        "rasterbench=info"
    };
    let make_env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match build_trace_file_layer(service, traces)? {
        Some((writer, guard, path)) => {
            let subscriber = tracing_subscriber::registry()
                .with(make_env_filter())
                .with(fmt::layer().with_target(false))
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_target(true)
                        .with_writer(writer)
                        .with_filter(LevelFilter::TRACE),
                );
            let _ = TRACE_GUARD.set(guard);
            let _ = ACTIVE_TRACE_FILE.set(path);
            install_subscriber(subscriber)?;
        }
        None => {
            let subscriber = tracing_subscriber::registry()
                .with(make_env_filter())
                .with(fmt::layer().with_target(false));
            install_subscriber(subscriber)?;
        }
    }

    Ok(())
}

/// Returns the trace file written by the current process, if any.
pub fn current_trace_file() -> Option<&'static PathBuf> {
    ACTIVE_TRACE_FILE.get()
}

/// Trace export state; the directory is only scanned while export is enabled.
pub fn trace_report(traces: &TraceSettings) -> Result<TraceReport> {
    let (directory, recent_files) = if traces.enabled {
        let dir = traces.resolve_directory()?;
        let recent = collect_recent_trace_files(&dir, traces.max_files.saturating_add(2))?;
        (Some(dir), recent)
    } else {
        (traces.resolve_directory().ok(), Vec::new())
    };

    Ok(TraceReport {
        enabled: traces.enabled,
        directory,
        active_file: ACTIVE_TRACE_FILE.get().cloned(),
        recent_files,
    })
}

fn build_trace_file_layer(
    service: &str,
    traces: &TraceSettings,
) -> Result<Option<(NonBlocking, WorkerGuard, PathBuf)>> {
    if !traces.enabled {
        return Ok(None);
    }

    let directory = traces.resolve_directory()?;
    fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create trace directory {}", directory.display()))?;

    let (file, path) = create_trace_file(service, &directory)?;
    prune_old_traces(&directory, traces.max_files, &path)?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    Ok(Some((writer, guard, path)))
}

fn create_trace_file(service: &str, directory: &Path) -> Result<(fs::File, PathBuf)> {
    let service = sanitize_service(service);
    let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let mut candidate = directory.join(format!("{service}-{timestamp}{TRACE_SUFFIX}"));
    let mut counter = 0;
    while candidate.exists() {
        counter += 1;
        candidate = directory.join(format!("{service}-{timestamp}-{counter}{TRACE_SUFFIX}"));
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&candidate)
        .with_context(|| format!("Failed to open trace file {}", candidate.display()))?;
    Ok((file, candidate))
}

/// Trace files in `directory`, newest first.
fn list_trace_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<(SystemTime, PathBuf)> = Vec::new();
    if !directory.exists() {
        return Ok(Vec::new());
    }
    for entry in fs::read_dir(directory)
        .with_context(|| format!("Failed to read trace directory {}", directory.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|value| value.to_str()) else {
            continue;
        };
        if !name.ends_with(TRACE_SUFFIX) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|metadata| metadata.modified()) else {
            continue;
        };
        entries.push((modified, path));
    }
    entries.sort_by_key(|(modified, _)| Reverse(*modified));
    Ok(entries.into_iter().map(|(_, path)| path).collect())
}

/// Keep at most `max_files` traces including `keep`; zero disables pruning.
fn prune_old_traces(directory: &Path, max_files: usize, keep: &Path) -> Result<()> {
    if max_files == 0 {
        return Ok(());
    }
    let retain = max_files.saturating_sub(1);
    let stale = list_trace_files(directory)?
        .into_iter()
        .filter(|path| path != keep)
        .skip(retain);
    for path in stale {
        let _ = fs::remove_file(&path);
    }
    Ok(())
}

fn collect_recent_trace_files(directory: &Path, limit: usize) -> Result<Vec<PathBuf>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut files = list_trace_files(directory)?;
    files.truncate(limit);
    Ok(files)
}

fn sanitize_service(service: &str) -> String {
    service
        .chars()
        .map(|ch| match ch {
            'a'..='z' | '0'..='9' | '-' | '_' => ch,
            'A'..='Z' => ch.to_ascii_lowercase(),
            _ => '-',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_service_normalises_name() {
        assert_eq!(sanitize_service("Raster Bench@2014"), "raster-bench-2014");
    }

    #[test]
    fn trace_files_get_unique_names() {
        let dir = tempdir().expect("temp directory");
        let (_, first) = create_trace_file("rasterbench", dir.path()).unwrap();
        let (_, second) = create_trace_file("rasterbench", dir.path()).unwrap();
        assert_ne!(first, second);
        assert!(first.to_string_lossy().ends_with(TRACE_SUFFIX));
    }

    #[test]
    fn prune_keeps_newest_files() {
        let dir = tempdir().expect("temp directory");
        for index in 0..5 {
            fs::write(dir.path().join(format!("old-{index}{TRACE_SUFFIX}")), "{}").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        let keep = dir.path().join(format!("current{TRACE_SUFFIX}"));
        fs::write(&keep, "{}").unwrap();

        prune_old_traces(dir.path(), 3, &keep).unwrap();

        let remaining = list_trace_files(dir.path()).unwrap();
        assert_eq!(remaining.len(), 3);
        assert!(remaining.contains(&keep));
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn report_lists_recent_traces() {
        let dir = tempdir().expect("temp directory");
        fs::write(dir.path().join(format!("a{TRACE_SUFFIX}")), "{}").unwrap();
        let traces = TraceSettings {
            enabled: true,
            directory: Some(dir.path().to_path_buf()),
            max_files: 1,
        };
        let report = trace_report(&traces).unwrap();
        assert!(report.enabled);
        assert_eq!(report.directory.as_deref(), Some(dir.path()));
        assert_eq!(report.recent_files.len(), 1);
    }

    #[test]
    fn disabled_report_skips_directory_scan() {
        let dir = tempdir().expect("temp directory");
        let not_a_dir = dir.path().join("not-a-dir");
        fs::write(&not_a_dir, "plain file").unwrap();
        let traces = TraceSettings {
            enabled: false,
            directory: Some(not_a_dir.clone()),
            max_files: 10,
        };
        let report = trace_report(&traces).expect("report for disabled export");
        assert!(!report.enabled);
        assert_eq!(report.directory, Some(not_a_dir));
        assert!(report.recent_files.is_empty());
    }

    #[test]
    fn enabled_export_opens_trace_file_and_prunes() {
        let dir = tempdir().expect("temp directory");
        let traces_dir = dir.path().join("traces");
        fs::create_dir_all(&traces_dir).unwrap();
        for index in 0..3 {
            fs::write(traces_dir.join(format!("old-{index}{TRACE_SUFFIX}")), "{}").unwrap();
        }
        let traces = TraceSettings {
            enabled: true,
            directory: Some(traces_dir.clone()),
            max_files: 2,
        };

        let (_writer, _guard, path) = build_trace_file_layer("Raster Bench", &traces)
            .unwrap()
            .expect("trace layer when export is enabled");
        assert!(path.starts_with(&traces_dir));
        assert!(path.exists());
        let name = path.file_name().and_then(|name| name.to_str()).unwrap();
        assert!(name.starts_with("raster-bench-"));

        let remaining = list_trace_files(&traces_dir).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&path));
    }

    #[test]
    fn disabled_export_builds_no_layer() {
        let traces = TraceSettings {
            enabled: false,
            directory: None,
            max_files: 10,
        };
        assert!(build_trace_file_layer("rasterbench", &traces).unwrap().is_none());
    }
}
