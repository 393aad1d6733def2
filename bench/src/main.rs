//! Runs the three timed scenarios and prints one line per measurement.
//!
//! Configuration comes from the environment (or a `.env` file in the working
//! directory); see `bench_core::config` for the variables.
//!
//! Usage:
//!   cargo run --release
//!   BENCH_TARGET_PATH=/mnt/disk/scratch.tmp BENCH_DATABASE_URL=bench.db cargo run --release

use std::process;

use bench_core::BenchConfig;
use crude_bench::suite::run_all;

fn main() {
    // A missing .env file is normal.
    dotenvy::dotenv().ok();

    let config = BenchConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {:#}. Exiting.", e);
        process::exit(1);
    });

    bench_core::initialize_logger(config.log_level, config.log_file.as_deref()).unwrap_or_else(
        |e| {
            eprintln!("Failed to initialize logger: {:#}. Exiting.", e);
            process::exit(1);
        },
    );

    log::info!(
        "Starting crude-bench v{} ({} clock)",
        env!("CARGO_PKG_VERSION"),
        config.clock
    );
    log::debug!("Configuration: {:?}", config);

    match run_all(&config) {
        Ok(measurements) => {
            let total: f64 = measurements.iter().map(|m| m.elapsed_seconds()).sum();
            log::info!(
                "Finished {} measurements in {:.3}s of timed work",
                measurements.len(),
                total
            );
        }
        Err(e) => {
            log::error!("Benchmark failed: {:#}", e);
            process::exit(1);
        }
    }
}
