//! workpulse CLI entry point

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use workpulse::accumulator::{Accumulator, CorrelationAccumulator, LexicalAccumulator};
use workpulse::chunker::{CorrelationChunker, LexicalChunker};
use workpulse::config::cli::{Cli, KernelType};
use workpulse::config::Config;
use workpulse::dispatcher::Dispatcher;
use workpulse::kernel::{CorrelationKernel, LexicalKernel};
use workpulse::output::text;
use workpulse::worker::WorkerPool;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse_args();
    cli.validate()?;
    let config = Config::from_cli(&cli);

    println!("workpulse v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "{} kernel, {} workers, {} sources",
        match config.kernel {
            KernelType::Lexical => "lexical",
            KernelType::Correlation => "correlation",
        },
        config.workers,
        config.sources.len()
    );

    let start = Instant::now();
    match config.kernel {
        KernelType::Lexical => run_lexical(&config)?,
        KernelType::Correlation => run_correlation(&config)?,
    }
    println!();
    println!("Elapsed time = {:.6} s", start.elapsed().as_secs_f64());
    Ok(())
}

fn source_names(config: &Config) -> Vec<String> {
    config
        .sources
        .iter()
        .map(|path| path.display().to_string())
        .collect()
}

fn run_lexical(config: &Config) -> Result<()> {
    let pool = WorkerPool::spawn(config.workers, Arc::new(LexicalKernel::new()))?;
    let mut dispatcher = Dispatcher::new(pool);
    let mut chunker = LexicalChunker::new(
        &config.sources,
        config.tokens_per_unit,
        config.lexical_unit_capacity(),
    );
    let mut accumulator = LexicalAccumulator::new(source_names(config));

    let summary = dispatcher.run(&mut chunker, &mut accumulator)?;
    let report = accumulator.finalize()?;

    text::print_lexical_report(&report);
    text::print_dispatch_summary(&summary);
    Ok(())
}

fn run_correlation(config: &Config) -> Result<()> {
    let pool = WorkerPool::spawn(config.workers, Arc::new(CorrelationKernel::new()))?;
    let mut dispatcher = Dispatcher::new(pool);
    let mut chunker = CorrelationChunker::new(&config.sources, config.lags_per_unit);
    let mut accumulator = CorrelationAccumulator::new(source_names(config));

    let summary = dispatcher.run(&mut chunker, &mut accumulator)?;
    for (source_id, expected) in chunker.take_expected() {
        accumulator.set_expected(source_id, expected)?;
    }
    let report = accumulator.finalize()?;

    text::print_correlation_report(&report);
    text::print_dispatch_summary(&summary);
    Ok(())
}
