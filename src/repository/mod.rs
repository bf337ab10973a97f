// Repositories - thin persistence layer over a borrowed rusqlite Connection
//
// Every repository borrows the connection for its lifetime, so the caller
// decides locking and sharing. Multi-statement writes run in one transaction.

pub mod ingredient;
pub mod order;
pub mod taco;
pub mod user;

pub use ingredient::IngredientRepository;
pub use order::{OrderError, OrderRepository};
pub use taco::{TacoError, TacoRepository};
pub use user::UserRepository;

use rusqlite::{params_from_iter, Connection};

use crate::entities::Record;

/// Build `INSERT INTO table (a, b) VALUES (?1, ?2)` for the record's columns.
fn insert_sql(table: &str, record: &[(&'static str, rusqlite::types::Value)]) -> String {
    let columns: Vec<&str> = record.iter().map(|(column, _)| *column).collect();
    let placeholders: Vec<String> = (1..=record.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Insert one row built from a column record.
pub fn insert_record(conn: &Connection, table: &str, record: &Record) -> rusqlite::Result<usize> {
    let sql = insert_sql(table, record);
    conn.execute(&sql, params_from_iter(record.iter().map(|(_, value)| value)))
}

/// Insert one row and return the key SQLite generated for it.
pub fn insert_returning_key(
    conn: &Connection,
    table: &str,
    record: &Record,
) -> rusqlite::Result<i64> {
    insert_record(conn, table, record)?;
    Ok(conn.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    #[test]
    fn test_insert_sql_numbers_placeholders() {
        let record: Record = vec![
            ("taco_order", Value::Integer(1)),
            ("taco", Value::Integer(2)),
            ("position", Value::Integer(0)),
        ];

        assert_eq!(
            insert_sql("taco_order_tacos", &record),
            "INSERT INTO taco_order_tacos (taco_order, taco, position) VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn test_insert_returning_key_is_sequential() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::setup_database(&conn).unwrap();

        let record: Record = vec![
            ("name", Value::Text("First".to_string())),
            ("created_at", Value::Text("2024-01-01T00:00:00.000000Z".to_string())),
        ];

        let first = insert_returning_key(&conn, "taco", &record).unwrap();
        let second = insert_returning_key(&conn, "taco", &record).unwrap();

        assert!(first > 0);
        assert_eq!(second, first + 1);
    }
}
