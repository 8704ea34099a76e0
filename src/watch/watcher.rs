//! Watcher thread: notify + debounce, send settled path batches to main.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};

use crate::error::{Result, RevallError};

/// Watch `root` and send every batch of paths that has been quiet for `debounce_ms`.
///
/// Paths for which `ignore` returns true never enter a batch. The thread exits
/// when the receiving side of `tx` is dropped or on watcher error.
pub fn run_watcher_thread(
    root: &Path,
    debounce_ms: u64,
    ignore: impl Fn(&Path) -> bool,
    tx: mpsc::Sender<Vec<PathBuf>>,
) -> Result<()> {
    let root = root.to_path_buf();
    let debounce = Duration::from_millis(debounce_ms);

    let (event_tx, event_rx) = mpsc::channel::<Vec<PathBuf>>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(ev) = res {
            let _ = event_tx.send(ev.paths);
        }
    })
    .map_err(|e| RevallError::Watch(e.to_string()))?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|e| RevallError::Watch(e.to_string()))?;

    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        match event_rx.recv_timeout(debounce) {
            Ok(paths) => {
                let now = Instant::now();
                for p in paths.into_iter().filter(|p| !ignore(p.as_path())) {
                    pending.insert(p, now);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let batch = settled(&mut pending, Instant::now(), debounce);
                if !batch.is_empty() && tx.send(batch).is_err() {
                    return Ok(());
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

/// Remove and return, sorted, every pending path untouched for at least `debounce`.
fn settled(pending: &mut HashMap<PathBuf, Instant>, now: Instant, debounce: Duration) -> Vec<PathBuf> {
    let mut ready: Vec<PathBuf> = pending
        .iter()
        .filter(|(_, t)| now.duration_since(**t) >= debounce)
        .map(|(p, _)| p.clone())
        .collect();
    for p in &ready {
        pending.remove(p);
    }
    ready.sort();
    ready
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_only_returns_quiet_paths() {
        let debounce = Duration::from_millis(100);
        let start = Instant::now();
        let mut pending = HashMap::new();
        pending.insert(PathBuf::from("/src/b.css"), start);
        pending.insert(PathBuf::from("/src/a.css"), start);
        pending.insert(PathBuf::from("/src/c.css"), start + Duration::from_millis(80));

        let batch = settled(&mut pending, start + Duration::from_millis(120), debounce);
        assert_eq!(batch, vec![PathBuf::from("/src/a.css"), PathBuf::from("/src/b.css")]);
        assert_eq!(pending.len(), 1);

        let batch = settled(&mut pending, start + Duration::from_millis(200), debounce);
        assert_eq!(batch, vec![PathBuf::from("/src/c.css")]);
        assert!(pending.is_empty());
    }
}
