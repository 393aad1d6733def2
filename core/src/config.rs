//! Run configuration.
//!
//! Every knob comes from an environment variable (a `.env` file is loaded by
//! the binary before this runs) and falls back to a default that reproduces
//! the classic run: a 1000×1000 eigenvalue problem, a 256 MiB file and a
//! million database rows.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, ensure, Context, Result};
use log::LevelFilter;

use crate::timer::ClockSource;

pub const ENV_TARGET_PATH: &str = "BENCH_TARGET_PATH";
pub const ENV_DATABASE_URL: &str = "BENCH_DATABASE_URL";
pub const ENV_ROW_COUNT: &str = "BENCH_ROW_COUNT";
pub const ENV_MATRIX_SIZE: &str = "BENCH_MATRIX_SIZE";
pub const ENV_BUFFER_BYTES: &str = "BENCH_BUFFER_BYTES";
pub const ENV_SEED: &str = "BENCH_SEED";
pub const ENV_CLOCK: &str = "BENCH_CLOCK";
pub const ENV_LOG_LEVEL: &str = "BENCH_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "BENCH_LOG_FILE";

pub const DEFAULT_DATABASE_URL: &str = "crude-bench.sqlite";
pub const DEFAULT_ROW_COUNT: usize = 1_000_000;
pub const DEFAULT_MATRIX_SIZE: usize = 1000;
pub const DEFAULT_BUFFER_BYTES: usize = 256 * 1024 * 1024;
pub const DEFAULT_SEED: u64 = 0x5EED_0F_C0FFEE;
const TEMP_FILE_NAME: &str = "crude-bench.tmp";

/// Settings passed explicitly into every timed routine.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Where the disk test writes (and later deletes) its scratch file.
    pub target_path: PathBuf,
    /// SQLite database path, or `:memory:`.
    pub connection_string: String,
    /// Rows written to and read back from the benchmark table.
    pub row_count: usize,
    /// Edge length of the square matrix handed to the eigen solver.
    pub matrix_size: usize,
    /// Size of the buffer written to and read back from disk.
    pub buffer_bytes: usize,
    /// Seed for every generated working set.
    pub seed: u64,
    pub clock: ClockSource,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            target_path: env::temp_dir().join(TEMP_FILE_NAME),
            connection_string: DEFAULT_DATABASE_URL.to_string(),
            row_count: DEFAULT_ROW_COUNT,
            matrix_size: DEFAULT_MATRIX_SIZE,
            buffer_bytes: DEFAULT_BUFFER_BYTES,
            seed: DEFAULT_SEED,
            clock: ClockSource::default(),
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl BenchConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup. Unset or
    /// blank variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let config = Self {
            target_path: get(ENV_TARGET_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.target_path),
            connection_string: get(ENV_DATABASE_URL).unwrap_or(defaults.connection_string),
            row_count: parse_or(get(ENV_ROW_COUNT), ENV_ROW_COUNT, defaults.row_count)?,
            matrix_size: parse_or(get(ENV_MATRIX_SIZE), ENV_MATRIX_SIZE, defaults.matrix_size)?,
            buffer_bytes: parse_or(get(ENV_BUFFER_BYTES), ENV_BUFFER_BYTES, defaults.buffer_bytes)?,
            seed: parse_or(get(ENV_SEED), ENV_SEED, defaults.seed)?,
            clock: match get(ENV_CLOCK) {
                Some(raw) => raw.parse().with_context(|| format!("invalid {ENV_CLOCK}"))?,
                None => defaults.clock,
            },
            log_level: parse_or(get(ENV_LOG_LEVEL), ENV_LOG_LEVEL, defaults.log_level)?,
            log_file: get(ENV_LOG_FILE).map(PathBuf::from).or(defaults.log_file),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.row_count > 0, "{ENV_ROW_COUNT} must be greater than zero");
        ensure!(self.matrix_size > 0, "{ENV_MATRIX_SIZE} must be greater than zero");
        ensure!(self.buffer_bytes > 0, "{ENV_BUFFER_BYTES} must be greater than zero");
        ensure!(
            !self.connection_string.is_empty(),
            "{ENV_DATABASE_URL} must not be empty"
        );
        Ok(())
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(raw) => raw
            .replace('_', "")
            .parse()
            .map_err(|e| anyhow!("invalid {name}={raw:?}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<BenchConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BenchConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.matrix_size, DEFAULT_MATRIX_SIZE);
        assert_eq!(config.row_count, DEFAULT_ROW_COUNT);
        assert_eq!(config.buffer_bytes, DEFAULT_BUFFER_BYTES);
        assert_eq!(config.connection_string, DEFAULT_DATABASE_URL);
        assert_eq!(config.clock, ClockSource::Monotonic);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(config.log_file.is_none());
        assert!(config.target_path.ends_with(TEMP_FILE_NAME));
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            (ENV_TARGET_PATH, "/data/scratch.bin"),
            (ENV_DATABASE_URL, ":memory:"),
            (ENV_ROW_COUNT, "1_000"),
            (ENV_MATRIX_SIZE, "64"),
            (ENV_BUFFER_BYTES, "4096"),
            (ENV_SEED, "7"),
            (ENV_CLOCK, "cpu"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_FILE, "bench.log"),
        ])
        .unwrap();

        assert_eq!(config.target_path, PathBuf::from("/data/scratch.bin"));
        assert_eq!(config.connection_string, ":memory:");
        assert_eq!(config.row_count, 1000);
        assert_eq!(config.matrix_size, 64);
        assert_eq!(config.buffer_bytes, 4096);
        assert_eq!(config.seed, 7);
        assert_eq!(config.clock, ClockSource::ProcessCpu);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("bench.log")));
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = config_from(&[(ENV_ROW_COUNT, "  "), (ENV_DATABASE_URL, "")]).unwrap();
        assert_eq!(config.row_count, DEFAULT_ROW_COUNT);
        assert_eq!(config.connection_string, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = config_from(&[(ENV_MATRIX_SIZE, "big")]).unwrap_err();
        assert!(err.to_string().contains(ENV_MATRIX_SIZE), "{err}");
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(config_from(&[(ENV_ROW_COUNT, "0")]).is_err());
        assert!(config_from(&[(ENV_MATRIX_SIZE, "0")]).is_err());
        assert!(config_from(&[(ENV_BUFFER_BYTES, "0")]).is_err());
    }

    #[test]
    fn unknown_clock_is_rejected() {
        let err = config_from(&[(ENV_CLOCK, "sundial")]).unwrap_err();
        assert!(format!("{err:#}").contains("sundial"), "{err:#}");
    }
}
