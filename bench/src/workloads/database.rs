//! SQLite side of the benchmark: one table with three integer columns.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

pub const TABLE_NAME: &str = "benchmark";

/// Connection string that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// One row of the benchmark table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BenchRow {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

/// Open the database named by `connection_string` and apply the pragmas.
///
/// The connection closes when the returned value is dropped.
pub fn open(connection_string: &str) -> Result<Connection> {
    let conn = if connection_string == IN_MEMORY {
        Connection::open_in_memory()
    } else {
        Connection::open(connection_string)
    }
    .with_context(|| format!("opening database {connection_string}"))?;

    configure_connection(&conn)?;
    Ok(conn)
}

/// Journal and cache settings for bulk writes.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -65536;
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(())
}

/// Drop any previous benchmark table and create an empty one.
pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {TABLE_NAME};
         CREATE TABLE {TABLE_NAME} (
             a INTEGER NOT NULL,
             b INTEGER NOT NULL,
             c INTEGER NOT NULL
         );"
    ))
    .context("creating benchmark table")?;
    Ok(())
}

/// Append `rows` in a single transaction. Returns the number of rows written.
pub fn append_rows(conn: &mut Connection, rows: &[BenchRow]) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {TABLE_NAME} (a, b, c) VALUES (?1, ?2, ?3)"
        ))?;
        for row in rows {
            stmt.execute(params![row.a, row.b, row.c])?;
        }
    }
    tx.commit().context("committing benchmark rows")?;
    Ok(rows.len())
}

/// Read the whole table back. No ordering is guaranteed.
pub fn read_rows(conn: &Connection) -> Result<Vec<BenchRow>> {
    let mut stmt = conn.prepare(&format!("SELECT a, b, c FROM {TABLE_NAME}"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(BenchRow {
                a: r.get(0)?,
                b: r.get(1)?,
                c: r.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn row_count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |r| {
        r.get(0)
    })?;
    Ok(count as usize)
}

/// True when both slices hold the same rows, ignoring order.
pub fn same_rows(written: &[BenchRow], read: &[BenchRow]) -> bool {
    if written.len() != read.len() {
        return false;
    }
    let mut left = written.to_vec();
    let mut right = read.to_vec();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(a: i64, b: i64, c: i64) -> BenchRow {
        BenchRow { a, b, c }
    }

    #[test]
    fn create_append_read() {
        let mut conn = open(IN_MEMORY).unwrap();
        create_table(&conn).unwrap();

        let rows = vec![row(1, 2, 3), row(4, 5, 6), row(1, 2, 3)];
        assert_eq!(append_rows(&mut conn, &rows).unwrap(), 3);
        assert_eq!(row_count(&conn).unwrap(), 3);
        assert!(same_rows(&rows, &read_rows(&conn).unwrap()));
    }

    #[test]
    fn append_keeps_existing_rows() {
        let mut conn = open(IN_MEMORY).unwrap();
        create_table(&conn).unwrap();
        append_rows(&mut conn, &[row(1, 1, 1)]).unwrap();
        append_rows(&mut conn, &[row(2, 2, 2)]).unwrap();
        assert_eq!(row_count(&conn).unwrap(), 2);
    }

    #[test]
    fn create_table_replaces_previous_contents() {
        let mut conn = open(IN_MEMORY).unwrap();
        create_table(&conn).unwrap();
        append_rows(&mut conn, &[row(9, 9, 9)]).unwrap();

        create_table(&conn).unwrap();
        assert_eq!(row_count(&conn).unwrap(), 0);
    }

    #[test]
    fn read_without_table_fails() {
        let conn = open(IN_MEMORY).unwrap();
        assert!(read_rows(&conn).is_err());
    }

    #[test]
    fn same_rows_ignores_order_but_not_multiplicity() {
        let a = [row(1, 2, 3), row(4, 5, 6)];
        let b = [row(4, 5, 6), row(1, 2, 3)];
        assert!(same_rows(&a, &b));
        assert!(!same_rows(&a, &[row(1, 2, 3), row(1, 2, 3)]));
        assert!(!same_rows(&a, &a[..1]));
    }
}
