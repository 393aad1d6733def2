//! The bodies of work that get timed.
//!
//! Each module is a thin layer over an external library:
//! - [`compute`] — nalgebra's real Schur decomposition
//! - [`disk`] — plain `std::fs` files, no buffering layer
//! - [`database`] — SQLite through rusqlite

pub mod compute;
pub mod database;
pub mod disk;
