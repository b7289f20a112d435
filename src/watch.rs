//! File watcher: runs `build` on startup, then re-runs on content changes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, OutputFormat};
use docxref::config::{CONFIG_FILE, Config};
use docxref::diagnostics;
use docxref::error;

/// Debounce delay between filesystem events and rebuild.
const DEBOUNCE_MS: u64 = 100;

/// Content directories that exist, watched recursively.
fn collect_watch_dirs(root: &Path, config: &Config) -> BTreeSet<PathBuf> {
    return config
        .manual
        .iter()
        .chain(&config.api)
        .map(|dir| return root.join(dir))
        .filter(|dir| return dir.is_dir())
        .collect();
}

/// Create a filesystem watcher that sends events on the given channel.
/// Events that only touch the manifest itself are dropped so a rebuild
/// never triggers another one.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    manifest_path: PathBuf,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && !only_touches_manifest(&event.paths, &manifest_path)
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::WatchFailed {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Whether every path of an event is the manifest itself.
fn only_touches_manifest(paths: &[PathBuf], manifest_path: &Path) -> bool {
    return !paths.is_empty() && paths.iter().all(|p| return p.ends_with(manifest_path));
}

/// Entry point for the watch command.
///
/// Runs an initial build, then watches content directories and the config
/// file and rebuilds on changes. Every rebuild is a full build.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup.
pub fn run(root: &Path) -> Result<ExitCode, error::Error> {
    tracing::info!("watch: initial build");
    let mut last_code = run_build(root);

    let config = Config::load(root)?;
    let watch_dirs = collect_watch_dirs(root, &config);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, config.output.clone())?;

    for dir in &watch_dirs {
        if let Err(e) = watcher.watch(dir, RecursiveMode::Recursive) {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot watch directory");
        }
    }
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() {
        let _ = watcher.watch(&config_path, RecursiveMode::NonRecursive);
    }

    let dir_count = watch_dirs.len();
    eprintln!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, rebuilding...");
        last_code = run_build(root);
    }

    return Ok(last_code);
}

/// Run build once and print the result. Returns the exit code from build.
fn run_build(root: &Path) -> ExitCode {
    return match commands::build(root, false, OutputFormat::Text) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}
