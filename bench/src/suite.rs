//! The three timed scenarios.
//!
//! Working sets are generated before a timer opens, so only the library call
//! under test is measured. Every timed block prints its line as soon as it
//! ends, whether it succeeded or not; errors then propagate unchanged.

use anyhow::{ensure, Result};
use bench_core::{measure, BenchConfig, Measurement, ScopedTimer};

use crate::populate::{generate_rows, random_bytes, random_matrix};
use crate::workloads::disk::{self, TempFile};
use crate::workloads::{compute, database};

pub const COMPUTATION_LABEL: &str = "computation";
pub const DISK_WRITE_LABEL: &str = "disk write";
pub const DISK_READ_LABEL: &str = "disk read";
pub const DATABASE_WRITE_LABEL: &str = "database write";
pub const DATABASE_READ_LABEL: &str = "database read";

/// Time one block on the configured clock. The report line is written before
/// the block's error, if any, is handed back.
fn timed_step<T>(
    config: &BenchConfig,
    label: &str,
    work: impl FnOnce() -> Result<T>,
) -> Result<(T, Measurement)> {
    let (result, measurement) = measure(ScopedTimer::begin_on(label, config.clock), work);
    Ok((result?, measurement))
}

/// Eigenvalues of a seeded `matrix_size`×`matrix_size` random matrix.
pub fn run_computation(config: &BenchConfig) -> Result<Vec<Measurement>> {
    let n = config.matrix_size;
    let matrix = random_matrix(n, config.seed);
    log::info!("Computing eigenvalues of a {n}x{n} matrix");

    let (eigenvalues, measurement) =
        timed_step(config, COMPUTATION_LABEL, || compute::eigenvalues(&matrix))?;
    log::debug!("{} eigenvalues computed", eigenvalues.len());

    Ok(vec![measurement])
}

/// Write `buffer_bytes` to `target_path`, read them back and delete the file.
pub fn run_disk(config: &BenchConfig) -> Result<Vec<Measurement>> {
    let buffer = random_bytes(config.buffer_bytes, config.seed);
    let temp = TempFile::new(&config.target_path);
    log::info!(
        "Writing and reading {} bytes at {}",
        buffer.len(),
        temp.path().display()
    );

    let ((), write) = timed_step(config, DISK_WRITE_LABEL, || {
        disk::write_buffer(temp.path(), &buffer)
    })?;
    let (read_back, read) =
        timed_step(config, DISK_READ_LABEL, || disk::read_buffer(temp.path()))?;

    ensure!(
        read_back == buffer,
        "disk read-back differs from what was written ({} bytes read, {} written)",
        read_back.len(),
        buffer.len()
    );

    Ok(vec![write, read])
}

/// Append `row_count` rows to a fresh benchmark table and read them back.
pub fn run_database(config: &BenchConfig) -> Result<Vec<Measurement>> {
    let rows = generate_rows(config.row_count, config.seed);
    log::info!(
        "Writing and reading {} rows in {}",
        rows.len(),
        config.connection_string
    );

    let mut conn = database::open(&config.connection_string)?;
    database::create_table(&conn)?;

    let (written, write) = timed_step(config, DATABASE_WRITE_LABEL, || {
        database::append_rows(&mut conn, &rows)
    })?;
    let (read_back, read) =
        timed_step(config, DATABASE_READ_LABEL, || database::read_rows(&conn))?;

    ensure!(
        written == rows.len() && database::same_rows(&rows, &read_back),
        "database read-back differs from what was written ({} rows read, {} written)",
        read_back.len(),
        written
    );

    Ok(vec![write, read])
}

/// Run every scenario in order, stopping at the first failure.
pub fn run_all(config: &BenchConfig) -> Result<Vec<Measurement>> {
    let mut measurements = run_computation(config)?;
    measurements.extend(run_disk(config)?);
    measurements.extend(run_database(config)?);
    Ok(measurements)
}
