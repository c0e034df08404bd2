//! Progress printer fed by batch snapshots.

use harvest_core::batch::ProgressStats;
use std::io::Write;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const PROGRESS_INTERVAL_MS: u128 = 500;

/// Spawn a task printing one status line per batch to stderr. It ends when
/// every sender is dropped, closing any unfinished line.
pub fn spawn_progress_printer() -> (mpsc::Sender<ProgressStats>, JoinHandle<()>) {
    let (progress_tx, mut progress_rx) = mpsc::channel::<ProgressStats>(16);
    let handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        let mut line_open = false;
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            let done = stats.completed >= stats.total;
            if now.duration_since(last_print).as_millis() >= PROGRESS_INTERVAL_MS || done {
                let mut err = std::io::stderr().lock();
                let _ = write!(
                    err,
                    "\r  {}: {}/{} ({:.1}%)  {} ok  {:.1}/s  ",
                    stats.label,
                    stats.completed,
                    stats.total,
                    stats.fraction() * 100.0,
                    stats.succeeded,
                    stats.per_sec()
                );
                if done {
                    let _ = writeln!(err);
                }
                let _ = err.flush();
                line_open = !done;
                last_print = now;
            }
        }
        if line_open {
            let _ = writeln!(std::io::stderr());
        }
    });
    (progress_tx, handle)
}
