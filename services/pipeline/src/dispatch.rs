//! Event dispatcher and per-book workers
//!
//! Routes events by instrument into bounded per-book inboxes, creating a
//! book and its worker thread on the first event for a new instrument.
//! Events for one instrument keep their source order; different
//! instruments process in parallel. Closing an inbox (dropping its
//! sender) is the shutdown signal; workers drain what is queued, then
//! exit.

use crossbeam_channel::{bounded, Receiver, Sender};
use matching_engine::OrderBook;
use std::collections::HashMap;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};
use types::order::OrderEvent;

/// Suggested capacity of each per-book inbox
pub const INBOX_CAPACITY: usize = 10_000;

/// Counters reported by one book worker on exit
#[derive(Debug, Default, Clone, Copy)]
pub struct BookStats {
    pub events_processed: u64,
    pub records_emitted: u64,
}

/// Aggregated counters over all books
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchStats {
    pub books: usize,
    pub events_dispatched: u64,
    pub events_processed: u64,
    pub records_emitted: u64,
}

struct BookHandle {
    inbox_tx: Sender<OrderEvent>,
    worker: JoinHandle<BookStats>,
}

/// Routes events to per-instrument book workers
pub struct Dispatcher {
    books: HashMap<String, BookHandle>,
    results_tx: Sender<String>,
    inbox_capacity: usize,
    events_dispatched: u64,
}

impl Dispatcher {
    pub fn new(results_tx: Sender<String>, inbox_capacity: usize) -> Self {
        Self {
            books: HashMap::new(),
            results_tx,
            inbox_capacity,
            events_dispatched: 0,
        }
    }

    /// Consume the event queue until the source disconnects it, routing
    /// each event to its instrument's inbox in arrival order.
    pub fn dispatch_all(&mut self, events_rx: &Receiver<OrderEvent>) {
        for event in events_rx.iter() {
            let inbox_capacity = self.inbox_capacity;
            let results_tx = &self.results_tx;
            let handle = self
                .books
                .entry(event.instrument.clone())
                .or_insert_with(|| {
                    debug!(instrument = %event.instrument, "creating order book");
                    spawn_book_worker(event.instrument.clone(), inbox_capacity, results_tx.clone())
                });

            // Blocks when the inbox is full: backpressure toward the source.
            if handle.inbox_tx.send(event).is_err() {
                error!("book inbox closed before shutdown; event dropped");
            } else {
                self.events_dispatched += 1;
            }
        }
    }

    /// Number of books created so far
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Close every inbox and wait for the workers to drain and exit.
    /// Dropping the dispatcher's result sender lets the sink finish once
    /// the last worker is gone.
    pub fn shutdown(self) -> DispatchStats {
        let mut stats = DispatchStats {
            books: self.books.len(),
            events_dispatched: self.events_dispatched,
            ..DispatchStats::default()
        };
        drop(self.results_tx);

        for (instrument, handle) in self.books {
            drop(handle.inbox_tx);
            match handle.worker.join() {
                Ok(book_stats) => {
                    debug!(
                        instrument = %instrument,
                        events = book_stats.events_processed,
                        records = book_stats.records_emitted,
                        "book worker exited"
                    );
                    stats.events_processed += book_stats.events_processed;
                    stats.records_emitted += book_stats.records_emitted;
                }
                Err(_) => error!(instrument = %instrument, "book worker panicked"),
            }
        }
        stats
    }
}

fn spawn_book_worker(
    instrument: String,
    inbox_capacity: usize,
    results_tx: Sender<String>,
) -> BookHandle {
    let (inbox_tx, inbox_rx) = bounded::<OrderEvent>(inbox_capacity);
    let name = format!("book-{instrument}");

    let worker = thread::Builder::new()
        .name(name)
        .spawn(move || {
            let mut book = OrderBook::new(instrument);
            let mut stats = BookStats::default();

            'events: for event in inbox_rx.iter() {
                stats.events_processed += 1;
                for record in book.process(event) {
                    if results_tx.send(record.to_csv()).is_err() {
                        error!(
                            instrument = book.instrument(),
                            "result queue closed; stopping book worker"
                        );
                        break 'events;
                    }
                    stats.records_emitted += 1;
                }
            }
            stats
        })
        .expect("failed to spawn book worker thread");

    BookHandle { inbox_tx, worker }
}
