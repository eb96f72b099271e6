mod cli;
mod dispatch;
mod lifecycle;
mod sink;
mod source;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too; they are not failures.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = init_logging(&cli) {
        eprintln!("failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    let log_destination = if cli.log_file.is_empty() {
        "<stdout>"
    } else {
        cli.log_file.as_str()
    };
    tracing::info!(
        input = %cli.order_input_file.display(),
        output = %cli.order_result_output_file.display(),
        log_level = ?cli.log_level,
        log_file = log_destination,
        queue_size = cli.queue_size,
        "configuration loaded"
    );

    let mut config = lifecycle::PipelineConfig::new(
        cli.order_input_file.clone(),
        cli.order_result_output_file.clone(),
    );
    config.event_queue_capacity = cli.queue_size;

    match lifecycle::run(config) {
        Ok(summary) => {
            tracing::info!(
                rows_read = summary.rows_read,
                events_parsed = summary.events_parsed,
                rows_dropped = summary.rows_dropped,
                books = summary.books,
                events_processed = summary.events_processed,
                records_written = summary.records_written,
                "run summary"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("pipeline failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Install the global tracing subscriber per the CLI's log options.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = cli.log_level.to_filter();

    if cli.log_file.is_empty() || cli.log_file == "none" {
        tracing_subscriber::fmt().with_max_level(filter).init();
    } else {
        let file = std::fs::File::create(&cli.log_file)
            .with_context(|| format!("failed to create log file {}", cli.log_file))?;
        tracing_subscriber::fmt()
            .with_max_level(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    }
    Ok(())
}
