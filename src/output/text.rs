//! Human-readable text output

use crate::accumulator::{CorrelationReport, LexicalReport};
use crate::dispatcher::DispatchSummary;

/// Print per-source lexical results: total word count, the word-length
/// histogram with percentages, and the joint vowel-count × word-length
/// percentage matrix.
pub fn print_lexical_report(report: &LexicalReport) {
    for src in &report.sources {
        println!();
        println!("Results for file: {}", src.name);
        println!();
        println!("Total number of words = {}", src.total_words);
        println!();

        // Length header, counts, percentages.
        print!("{:2}", "");
        for len in 1..=src.table_len() {
            print!("{:>6}", len);
        }
        println!();
        print!("{:2}", "");
        for &count in &src.length_counts {
            print!("{:>6}", count);
        }
        println!();
        print!("{:2}", "");
        for &pct in &src.length_pct {
            print!("{:>6.2}", pct);
        }
        println!();

        // Joint matrix: row v, columns from the shortest length that can
        // hold v vowels.
        for v in 0..=src.max_vowel_row() {
            print!("{:2}", v);
            if v > 1 {
                print!("{:width$}", "", width = 6 * (v - 1));
            }
            for k in v.max(1)..=src.table_len() {
                print!("{:>6.1}", src.vowel_pct[v][k - 1]);
            }
            println!();
        }
        println!();
    }
}

/// Print per-source verification results against the expected correlations.
pub fn print_correlation_report(report: &CorrelationReport) {
    println!();
    println!("Results vs expected results:");
    for src in &report.sources {
        println!(
            "For file {}: {} of {} lags differ from the expected results. \
             Error rate = {:.3}.",
            src.name, src.mismatches, src.num_samples, src.error_rate
        );
    }
    println!();
}

/// Print what the run dispatched and how it was spread over the pool.
pub fn print_dispatch_summary(summary: &DispatchSummary) {
    println!(
        "Dispatched {} units across {} workers",
        summary.units_dispatched,
        summary.per_worker_units.len()
    );
    for (worker, units) in summary.per_worker_units.iter().enumerate() {
        println!("  worker {worker}: {units} units");
    }
}
