//! Pipeline lifecycle
//!
//! Wires the staged pipeline together and orchestrates shutdown:
//! source EOF closes the event queue, the dispatcher drains it and closes
//! every inbox, workers drain and exit, and the sink flushes once the
//! result queue's last producer is gone.

use anyhow::Context;
use crossbeam_channel::bounded;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;
use tracing::info;
use types::order::OrderEvent;

use crate::dispatch::{Dispatcher, INBOX_CAPACITY};
use crate::{sink, source};

/// Default capacity of the source → dispatcher event queue
pub const EVENT_QUEUE_CAPACITY: usize = 100_000;
/// Capacity of the books → sink result queue
pub const RESULT_QUEUE_CAPACITY: usize = 10_000;

/// Runtime configuration of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub event_queue_capacity: usize,
    pub inbox_capacity: usize,
    pub result_queue_capacity: usize,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output,
            event_queue_capacity: EVENT_QUEUE_CAPACITY,
            inbox_capacity: INBOX_CAPACITY,
            result_queue_capacity: RESULT_QUEUE_CAPACITY,
        }
    }
}

/// Observable lifecycle states, in order of traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    DrainingSource,
    DrainingBooks,
    FlushingResults,
    Stopped,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Running => "RUNNING",
            PipelineState::DrainingSource => "DRAINING_SOURCE",
            PipelineState::DrainingBooks => "DRAINING_BOOKS",
            PipelineState::FlushingResults => "FLUSHING_RESULTS",
            PipelineState::Stopped => "STOPPED",
        };
        f.write_str(label)
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    info!(from = %state, to = %next, "pipeline state transition");
    *state = next;
}

/// Outcome counters of a completed run
#[derive(Debug, Clone, Copy)]
pub struct PipelineSummary {
    pub rows_read: u64,
    pub events_parsed: u64,
    pub rows_dropped: u64,
    pub books: usize,
    pub events_processed: u64,
    pub records_written: u64,
}

/// Run the full pipeline to completion.
///
/// Fatal failures (unopenable files, missing header, sink I/O errors)
/// surface as errors; everything else is absorbed as warnings or
/// REJECTED records.
pub fn run(config: PipelineConfig) -> anyhow::Result<PipelineSummary> {
    let started = Instant::now();

    let input = File::open(&config.input)
        .with_context(|| format!("failed to open input order file {}", config.input.display()))?;
    let output = File::create(&config.output).with_context(|| {
        format!(
            "failed to create result output file {}",
            config.output.display()
        )
    })?;

    let (events_tx, events_rx) = bounded::<OrderEvent>(config.event_queue_capacity);
    let (results_tx, results_rx) = bounded::<String>(config.result_queue_capacity);

    let mut state = PipelineState::Running;
    info!(%state, queue_capacity = config.event_queue_capacity, "pipeline started");

    let reader = thread::Builder::new()
        .name("event-source".into())
        .spawn(move || {
            let read_started = Instant::now();
            let result = source::read_events(input, events_tx);
            info!(
                elapsed_ms = read_started.elapsed().as_millis() as u64,
                "time reading from CSV"
            );
            result
        })
        .expect("failed to spawn event source thread");

    let writer = thread::Builder::new()
        .name("result-sink".into())
        .spawn(move || sink::write_results(output, results_rx))
        .expect("failed to spawn result sink thread");

    // The dispatcher owns the calling thread; its loop ends when the
    // source drops the event sender and the queue drains.
    let dispatch_started = Instant::now();
    let mut dispatcher = Dispatcher::new(results_tx, config.inbox_capacity);
    dispatcher.dispatch_all(&events_rx);

    transition(&mut state, PipelineState::DrainingSource);
    let source_stats = reader
        .join()
        .map_err(|_| anyhow::anyhow!("event source thread panicked"))??;

    transition(&mut state, PipelineState::DrainingBooks);
    let dispatch_stats = dispatcher.shutdown();
    info!(
        elapsed_ms = dispatch_started.elapsed().as_millis() as u64,
        books = dispatch_stats.books,
        "time processing order events"
    );

    transition(&mut state, PipelineState::FlushingResults);
    let records_written = writer
        .join()
        .map_err(|_| anyhow::anyhow!("result sink thread panicked"))?
        .context("writing result records")?;

    transition(&mut state, PipelineState::Stopped);
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        records = records_written,
        "matching engine run completed"
    );

    Ok(PipelineSummary {
        rows_read: source_stats.rows_read,
        events_parsed: source_stats.events_parsed,
        rows_dropped: source_stats.rows_dropped,
        books: dispatch_stats.books,
        events_processed: dispatch_stats.events_processed,
        records_written,
    })
}
