//! Result sink
//!
//! Drains formatted result lines from the shared result queue into the
//! output CSV. Exits when every producer (all book workers plus the
//! dispatcher) has dropped its sender and the queue is empty.

use crossbeam_channel::Receiver;
use std::io::{BufWriter, Write};
use tracing::info;
use types::record;

/// Write the header and every queued result line to `output`.
///
/// Returns the number of records written. I/O failures here are fatal to
/// the pipeline.
pub fn write_results<W: Write>(output: W, results_rx: Receiver<String>) -> std::io::Result<u64> {
    let mut writer = BufWriter::new(output);
    writeln!(writer, "{}", record::CSV_HEADER)?;

    let mut written = 0u64;
    for line in results_rx.iter() {
        writeln!(writer, "{line}")?;
        written += 1;
    }

    writer.flush()?;
    info!(records = written, "result stream flushed");
    Ok(written)
}
