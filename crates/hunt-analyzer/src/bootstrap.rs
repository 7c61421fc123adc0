use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.hunt-analyzer/` and its `logs/` subdirectory exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    ensure_directories_in(&hunt_core::settings::app_dir())
}

fn ensure_directories_in(app_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the CLI level names onto an `EnvFilter` directive.
fn filter_directive(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Events go to stderr, or are appended to `log_file` when one is given.
/// Unknown level strings fall back to `info`.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ── Comment pool discovery ─────────────────────────────────────────────────────

/// Locate the comment pool.
///
/// An explicit path (from `--comments` or saved preferences) is returned
/// as-is; otherwise the first existing file among
/// 1. `~/.hunt-analyzer/comments.json`
/// 2. `./resources/comments.json`
pub fn discover_comment_pool(explicit: Option<&Path>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover_comment_pool_from(explicit, &hunt_core::settings::app_dir(), &cwd)
}

fn discover_comment_pool_from(
    explicit: Option<&Path>,
    app_dir: &Path,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidates = [
        app_dir.join("comments.json"),
        cwd.join("resources").join("comments.json"),
    ];
    candidates.into_iter().find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
