//! Crude wall-clock benchmark
//!
//! Times three independent pieces of work, each wrapped in a
//! [`bench_core::ScopedTimer`] that prints one `"<secs>s <label>"` line:
//! - **computation**: eigenvalues of a seeded dense random matrix
//! - **disk write / disk read**: one large buffer to a scratch file and back
//! - **database write / database read**: a three-column integer table in SQLite
//!
//! Run benchmarks: `cargo run --release`
//! Run tests: `cargo test`

pub mod populate;
pub mod suite;
pub mod workloads;
