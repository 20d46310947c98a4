//! Debounced search-as-you-type controller.
//!
//! The controller turns a stream of keystrokes and barcode scans into at
//! most one in-flight request. Every change supersedes the previous task
//! (its `JoinHandle` is aborted, dropping any in-flight HTTP future), and
//! results are only published when their ticket still matches the latest
//! query. State is exposed as a `tokio::sync::watch` snapshot.

mod debounce;
mod types;

pub use debounce::publish_if_current;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::metrics::SEARCHES_SUPERSEDED;
use crate::search::FoodSearch;

/// Default keystroke debounce.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Single-caller search controller.
///
/// Must be driven from inside a tokio runtime.
pub struct SearchController {
    search: Arc<dyn FoodSearch>,
    debounce: Duration,
    state: Arc<watch::Sender<SearchSnapshot>>,
    seq: u64,
    task: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(search: Arc<dyn FoodSearch>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchSnapshot::default());
        Self {
            search,
            debounce,
            state: Arc::new(state),
            seq: 0,
            task: None,
        }
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    /// Handle a change of the query text.
    ///
    /// Empty or whitespace-only text goes straight to Idle with results
    /// cleared. Anything else moves to Pending and (re)starts the debounce
    /// timer; previous results stay visible until the new ones land.
    pub fn on_query_changed(&mut self, text: &str) {
        self.supersede();
        self.seq += 1;

        let query = text.trim();
        if query.is_empty() {
            debug!(seq = self.seq, "Query cleared");
            self.state.send_replace(SearchSnapshot::idle(self.seq));
            return;
        }

        let ticket = Ticket {
            seq: self.seq,
            query: query.to_string(),
        };

        self.state.send_modify(|snapshot| {
            snapshot.seq = ticket.seq;
            snapshot.query = ticket.query.clone();
            snapshot.phase = SearchPhase::Pending;
            snapshot.loading = false;
            snapshot.barcode = None;
        });

        self.task = Some(tokio::spawn(debounce::run_search(
            self.search.clone(),
            self.state.clone(),
            ticket,
            self.debounce,
        )));
    }

    /// Handle a barcode scan.
    ///
    /// Runs immediately (no debounce) and supersedes any pending or
    /// in-flight text search.
    pub fn on_barcode_scanned(&mut self, code: &str) {
        self.supersede();
        self.seq += 1;

        let code = code.trim().to_string();
        let ticket = Ticket {
            seq: self.seq,
            query: String::new(),
        };

        debug!(seq = self.seq, code = %code, "Barcode scanned");
        self.state.send_replace(SearchSnapshot {
            phase: SearchPhase::Searching,
            loading: true,
            barcode: Some(BarcodeScan {
                code: code.clone(),
                outcome: None,
            }),
            ..SearchSnapshot::idle(self.seq)
        });

        self.task = Some(tokio::spawn(debounce::run_barcode_lookup(
            self.search.clone(),
            self.state.clone(),
            ticket,
            code,
        )));
    }

    /// Abort the running task, if any.
    fn supersede(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                SEARCHES_SUPERSEDED.inc();
                debug!(seq = self.seq, "Superseding in-flight search");
            }
            task.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
