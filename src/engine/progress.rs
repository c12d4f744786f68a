//! Progress bar utilities for the store phase

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::ingest::ProgressCallback;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a progress bar over `total` records.
pub fn create_progress_bar(total: usize, desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        unit = " records"
    )))
}

/// Update progress bar if available.
/// Uses try_lock so a contended bar never blocks the caller; the next update catches up.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Create a progress callback function that updates the progress bar.
pub fn progress_callback(bar: &Option<ProgressBar>) -> Option<ProgressCallback> {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Box::new(move |n: usize| update_progress_bar(&bar, n)) as ProgressCallback
    })
}

/// Bar (when verbose) plus its callback for a store run over `total` records.
pub fn setup_progress(
    verbose: bool,
    total: usize,
) -> (Option<ProgressBar>, Option<ProgressCallback>) {
    let bar = verbose.then(|| create_progress_bar(total, "Storing"));
    let on_batch = progress_callback(&bar);
    (bar, on_batch)
}
