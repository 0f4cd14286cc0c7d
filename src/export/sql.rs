//! SQL dump export
//!
//! Produces a plain-text script that replaces the contents of every table:
//! `DELETE FROM` children first, `INSERT INTO` parents first, all inside one
//! transaction with foreign key checks deferred to the commit.

use std::io::Write;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use crate::error::{OffertoryError, OffertoryResult};
use crate::storage::{Database, Table};

/// Row counts of a dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpStats {
    /// `(table, rows)` in insert order
    pub tables: Vec<(&'static str, usize)>,
}

impl DumpStats {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|(_, rows)| rows).sum()
    }
}

/// Dump every table of `db` as SQL
pub fn dump_sql<W: Write>(db: &Database, writer: &mut W) -> OffertoryResult<DumpStats> {
    let script = db.read(render_dump)?;
    writer
        .write_all(script.0.as_bytes())
        .map_err(|e| OffertoryError::Export(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| OffertoryError::Export(e.to_string()))?;
    Ok(script.1)
}

fn render_dump(conn: &Connection) -> OffertoryResult<(String, DumpStats)> {
    let mut out = String::new();
    let mut stats = DumpStats::default();

    out.push_str("BEGIN TRANSACTION;\n");
    out.push_str("PRAGMA defer_foreign_keys = ON;\n");

    for table in Table::all().iter().rev() {
        out.push_str(&format!("DELETE FROM {};\n", table.name()));
    }

    for table in Table::all() {
        let rows = dump_table(conn, table.name(), &mut out)?;
        debug!(table = table.name(), rows, "dumped table");
        stats.tables.push((table.name(), rows));
    }

    out.push_str("COMMIT;\n");
    Ok((out, stats))
}

fn dump_table(conn: &Connection, table: &str, out: &mut String) -> OffertoryResult<usize> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY rowid", table))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_list = columns.join(", ");

    let mut rows = stmt.query([])?;
    let mut count = 0;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(sql_literal(row.get_ref(idx)?));
        }
        out.push_str(&format!(
            "INSERT INTO {} ({}) VALUES ({});\n",
            table,
            column_list,
            values.join(", ")
        ));
        count += 1;
    }
    Ok(count)
}

/// Render a value as an SQL literal
pub fn sql_literal(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format!("{:?}", f),
        ValueRef::Text(bytes) => quote_text(&String::from_utf8_lossy(bytes)),
        ValueRef::Blob(bytes) => format!("X'{}'", hex::encode_upper(bytes)),
    }
}

fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DonorName;
    use crate::storage::{initialize_storage, Storage};

    #[test]
    fn test_sql_literal() {
        assert_eq!(sql_literal(ValueRef::Null), "NULL");
        assert_eq!(sql_literal(ValueRef::Integer(-42)), "-42");
        assert_eq!(sql_literal(ValueRef::Real(1.5)), "1.5");
        assert_eq!(sql_literal(ValueRef::Text(b"O'Brien")), "'O''Brien'");
        assert_eq!(sql_literal(ValueRef::Blob(&[0x0a, 0xff])), "X'0AFF'");
    }

    #[test]
    fn test_dump_layout() {
        let storage = Storage::open_in_memory().unwrap();
        initialize_storage(&storage).unwrap();
        storage
            .donors
            .create(&DonorName::new("Pat", "O'Neil"))
            .unwrap();

        let mut output = Vec::new();
        let stats = dump_sql(storage.database(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "BEGIN TRANSACTION;");
        assert_eq!(*lines.last().unwrap(), "COMMIT;");

        // Children are cleared before parents
        let delete_pos = |t: &str| {
            lines
                .iter()
                .position(|l| *l == format!("DELETE FROM {};", t))
                .unwrap()
        };
        assert!(delete_pos("check_images") < delete_pos("donations"));
        assert!(delete_pos("donations") < delete_pos("batches"));
        assert!(delete_pos("batches") < delete_pos("users"));

        assert!(text.contains("'O''Neil'"));
        assert!(text.contains("INSERT INTO funds (id, name, bank_name, account_name, account_number) VALUES (1, 'General Fund'"));
        // admin, General Fund, one donor
        assert_eq!(stats.total_rows(), 3);
    }
}
