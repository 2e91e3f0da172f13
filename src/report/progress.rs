// src/report/progress.rs
// =============================================================================
// Progress bar for the checking phase.
//
// The checker never calls into presentation code: it sends Progress values on
// a channel, and this task turns them into an indicatif bar on stderr. When
// the checker drops its sender the loop ends and the bar is cleared.
// =============================================================================

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::checker::Progress;

const TEMPLATE: &str = "{spinner:.green} Checking [{bar:40.cyan/blue}] {pos}/{len} urls ({percent}%)";

/// Spawns the task that drains `updates`. The bar stays hidden when `quiet`
/// is set or stderr is not a terminal; the channel is drained either way.
pub fn spawn_progress_bar(
    mut updates: mpsc::UnboundedReceiver<Progress>,
    total: usize,
    quiet: bool,
) -> JoinHandle<()> {
    let bar = if quiet || !std::io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        visible_bar(total as u64)
    };

    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            bar.set_length(update.total as u64);
            bar.set_position(update.done as u64);
        }
        bar.finish_and_clear();
    })
}

fn visible_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    // An invalid template only loses the styling
    if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
        bar.set_style(style.progress_chars("█▓░"));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_ends_when_sender_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_progress_bar(rx, 2, true);

        tx.send(Progress { done: 1, total: 2 }).unwrap();
        tx.send(Progress { done: 2, total: 2 }).unwrap();
        drop(tx);

        handle.await.unwrap();
    }
}
