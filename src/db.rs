use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

use crate::entities::Ingredient;
use crate::repository::IngredientRepository;

/// Tables created by `setup_database`, in dependency order
pub const TABLES: [&str; 6] = [
    "ingredient",
    "taco",
    "taco_ingredients",
    "taco_order",
    "taco_order_tacos",
    "users",
];

// ============================================================================
// TIMESTAMPS
// Fixed-width RFC 3339 (UTC, microseconds) so that ORDER BY on the text
// column is chronological.
// ============================================================================

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Whether `ts` formats as a plain four-digit-year RFC 3339 string.
pub fn is_storable_timestamp(ts: &DateTime<Utc>) -> bool {
    (1..=9999).contains(&ts.year())
}

/// Parse a stored timestamp from column `idx` of a row.
pub fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Open (or create) the database file and make sure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {:?}", path))?;
    setup_database(&conn)?;
    info!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Per-connection; association rows must point at real tacos/orders
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS ingredient (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS taco (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS taco_ingredients (
            taco INTEGER NOT NULL REFERENCES taco(id),
            ingredient TEXT NOT NULL REFERENCES ingredient(id),
            position INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS taco_order (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            delivery_name TEXT NOT NULL,
            delivery_street TEXT NOT NULL,
            delivery_city TEXT NOT NULL,
            delivery_state TEXT NOT NULL,
            delivery_zip TEXT NOT NULL,
            cc_number TEXT NOT NULL,
            cc_expiration TEXT NOT NULL,
            cc_cvv TEXT NOT NULL,
            placed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS taco_order_tacos (
            taco_order INTEGER NOT NULL REFERENCES taco_order(id),
            taco INTEGER NOT NULL REFERENCES taco(id),
            position INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            full_name TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'USER'
        );

        CREATE INDEX IF NOT EXISTS idx_taco_created_at ON taco(created_at);
        CREATE INDEX IF NOT EXISTS idx_taco_ingredients_taco ON taco_ingredients(taco);
        CREATE INDEX IF NOT EXISTS idx_order_tacos_order ON taco_order_tacos(taco_order);",
    )?;

    debug!("schema verified");
    Ok(())
}

// ============================================================================
// INGREDIENT LOADING
// ============================================================================

/// Read ingredients from a CSV file with an `id,name,type` header.
pub fn load_ingredients_csv(csv_path: &Path) -> Result<Vec<Ingredient>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut ingredients = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let ingredient: Ingredient =
            result.with_context(|| format!("Failed to parse ingredient on row {}", line + 1))?;
        ingredients.push(ingredient);
    }

    Ok(ingredients)
}

/// Insert ingredients, skipping ids that already exist.
///
/// Returns how many rows were actually inserted.
pub fn import_ingredients(conn: &Connection, ingredients: &[Ingredient]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    let repo = IngredientRepository::new(conn);
    for ingredient in ingredients {
        match repo.save(ingredient.clone()) {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(inserted, duplicates, "ingredients imported");
    Ok(inserted)
}

/// Seed the default ingredient set. Safe to call on every startup.
pub fn seed_ingredients(conn: &Connection) -> Result<usize> {
    import_ingredients(conn, &Ingredient::defaults())
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    if !TABLES.contains(&table) {
        bail!("unknown table: {}", table);
    }

    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;

    Ok(count)
}
