//! Background tasks spawned by the controller.
//!
//! Each task owns a [`Ticket`] and publishes through [`publish_if_current`],
//! so a task that lost the race to a newer query changes nothing even if
//! it was not aborted in time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;

use super::types::{BarcodeScan, SearchPhase, SearchSnapshot, Ticket};
use crate::metrics::SEARCHES_SUPERSEDED;
use crate::search::{BarcodeOutcome, FoodSearch};

/// Apply `update` to the published snapshot only if `ticket` is current.
///
/// The check and the write happen under the channel's lock, so no newer
/// query can slip in between them.
pub fn publish_if_current(
    state: &watch::Sender<SearchSnapshot>,
    ticket: &Ticket,
    update: impl FnOnce(&mut SearchSnapshot),
) -> bool {
    state.send_if_modified(|snapshot| {
        if !ticket.matches(snapshot) {
            return false;
        }
        update(snapshot);
        true
    })
}

/// Wait out the debounce window, then run one text search.
pub async fn run_search(
    search: Arc<dyn FoodSearch>,
    state: Arc<watch::Sender<SearchSnapshot>>,
    ticket: Ticket,
    debounce: Duration,
) {
    sleep(debounce).await;

    let started = publish_if_current(&state, &ticket, |snapshot| {
        snapshot.phase = SearchPhase::Searching;
        snapshot.loading = true;
    });
    if !started {
        return;
    }

    debug!(seq = ticket.seq, query = %ticket.query, "Debounce elapsed, searching");
    let outcome = search.search(&ticket.query).await;

    let published = publish_if_current(&state, &ticket, |snapshot| {
        snapshot.phase = SearchPhase::Settled;
        snapshot.loading = false;
        snapshot.results = outcome.items;
        snapshot.answered_by = outcome.answered_by;
    });

    if !published {
        SEARCHES_SUPERSEDED.inc();
        debug!(seq = ticket.seq, query = %ticket.query, "Discarded stale search result");
    }
}

/// Run one barcode lookup immediately.
pub async fn run_barcode_lookup(
    search: Arc<dyn FoodSearch>,
    state: Arc<watch::Sender<SearchSnapshot>>,
    ticket: Ticket,
    code: String,
) {
    let outcome = search.lookup_barcode(&code).await;

    let published = publish_if_current(&state, &ticket, |snapshot| {
        snapshot.phase = SearchPhase::Settled;
        snapshot.loading = false;
        if let BarcodeOutcome::Found { item } = &outcome {
            snapshot.answered_by = Some(item.source);
            snapshot.results = vec![item.clone()];
        }
        snapshot.barcode = Some(BarcodeScan {
            code: code.clone(),
            outcome: Some(outcome),
        });
    });

    if !published {
        SEARCHES_SUPERSEDED.inc();
        debug!(seq = ticket.seq, code = %code, "Discarded stale barcode result");
    }
}
