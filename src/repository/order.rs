// 🧾 Order persistence
//
// save() writes the order header, reads back the generated key, then writes
// one (order, taco) association row per taco in list order. Header and
// associations share one transaction: a failure anywhere leaves no trace of
// the order in the store.

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

use super::{insert_record, insert_returning_key, TacoRepository};
use crate::db::parse_timestamp;
use crate::entities::{Record, TacoOrder};

#[derive(Debug, Error)]
pub enum OrderError {
    /// Save is create-only
    #[error("order {0} has already been saved")]
    AlreadySaved(i64),

    #[error("taco at position {position} has not been saved")]
    UnsavedTaco { position: usize },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub struct OrderRepository<'a> {
    conn: &'a Connection,
}

impl<'a> OrderRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Persist a new order and link its tacos.
    ///
    /// Stamps `placed_at` with the current time (overwriting any value the
    /// caller set) and returns the order carrying its generated id.
    pub fn save(&self, mut order: TacoOrder) -> Result<TacoOrder, OrderError> {
        if let Some(id) = order.id {
            return Err(OrderError::AlreadySaved(id));
        }

        // Every taco must already exist; check before touching the store
        let taco_ids = order
            .tacos
            .iter()
            .enumerate()
            .map(|(position, taco)| taco.id.ok_or(OrderError::UnsavedTaco { position }))
            .collect::<Result<Vec<i64>, _>>()?;

        order.placed_at = Some(Utc::now());

        let tx = self.conn.unchecked_transaction()?;
        let order_id = insert_returning_key(&tx, "taco_order", &order.to_record())?;

        for (position, taco_id) in taco_ids.iter().enumerate() {
            save_taco_to_order(&tx, order_id, *taco_id, position)?;
        }
        tx.commit()?;

        order.id = Some(order_id);
        info!(order_id, tacos = taco_ids.len(), "order placed");
        Ok(order)
    }

    /// Load an order header and its tacos in association order.
    pub fn find_by_id(&self, id: i64) -> anyhow::Result<Option<TacoOrder>> {
        let header = self
            .conn
            .query_row(
                "SELECT delivery_name, delivery_street, delivery_city, delivery_state,
                        delivery_zip, cc_number, cc_expiration, cc_cvv, placed_at
                 FROM taco_order WHERE id = ?1",
                params![id],
                |row| {
                    let placed_at: String = row.get(8)?;
                    Ok(TacoOrder {
                        id: Some(id),
                        placed_at: Some(parse_timestamp(8, &placed_at)?),
                        delivery_name: row.get(0)?,
                        delivery_street: row.get(1)?,
                        delivery_city: row.get(2)?,
                        delivery_state: row.get(3)?,
                        delivery_zip: row.get(4)?,
                        cc_number: row.get(5)?,
                        cc_expiration: row.get(6)?,
                        cc_cvv: row.get(7)?,
                        tacos: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut order) = header else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT taco FROM taco_order_tacos WHERE taco_order = ?1 ORDER BY position",
        )?;
        let taco_ids = stmt
            .query_map(params![id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let tacos = TacoRepository::new(self.conn);
        for taco_id in taco_ids {
            if let Some(taco) = tacos.find_by_id(taco_id)? {
                order.tacos.push(taco);
            }
        }

        Ok(Some(order))
    }
}

fn save_taco_to_order(
    conn: &Connection,
    order_id: i64,
    taco_id: i64,
    position: usize,
) -> rusqlite::Result<()> {
    let record: Record = vec![
        ("taco_order", Value::Integer(order_id)),
        ("taco", Value::Integer(taco_id)),
        ("position", Value::Integer(position as i64)),
    ];
    insert_record(conn, "taco_order_tacos", &record)?;
    debug!(order_id, taco_id, position, "taco linked to order");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, seed_ingredients, setup_database};
    use crate::entities::order::tests::sample_order;
    use crate::entities::{Ingredient, IngredientType, Taco};

    fn seeded_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        seed_ingredients(&conn).unwrap();
        conn
    }

    fn saved_taco(conn: &Connection, name: &str) -> Taco {
        TacoRepository::new(conn)
            .save(Taco::new(
                name,
                vec![Ingredient::new("FLTO", "Flour Tortilla", IngredientType::Wrap)],
            ))
            .unwrap()
    }

    fn association_rows(conn: &Connection) -> Vec<(i64, i64)> {
        let mut stmt = conn
            .prepare("SELECT taco_order, taco FROM taco_order_tacos ORDER BY rowid")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_save_links_tacos_in_list_order() {
        let conn = seeded_db();
        let t1 = saved_taco(&conn, "T1");
        let t2 = saved_taco(&conn, "T2");
        let t3 = saved_taco(&conn, "T3");

        let mut order = sample_order();
        order.add_taco(t3.clone());
        order.add_taco(t1.clone());
        order.add_taco(t2.clone());

        let saved = OrderRepository::new(&conn).save(order).unwrap();
        let order_id = saved.id.unwrap();

        assert_eq!(count_rows(&conn, "taco_order").unwrap(), 1);
        assert_eq!(
            association_rows(&conn),
            vec![
                (order_id, t3.id.unwrap()),
                (order_id, t1.id.unwrap()),
                (order_id, t2.id.unwrap()),
            ]
        );
        assert_eq!(saved.tacos, vec![t3, t1, t2]);
    }

    #[test]
    fn test_returned_id_matches_header_key() {
        let conn = seeded_db();
        let saved = OrderRepository::new(&conn).save(sample_order()).unwrap();

        let stored: i64 = conn
            .query_row("SELECT id FROM taco_order", [], |row| row.get(0))
            .unwrap();
        assert!(saved.id.unwrap() > 0);
        assert_eq!(saved.id, Some(stored));
    }

    #[test]
    fn test_zero_tacos_writes_header_only() {
        let conn = seeded_db();
        OrderRepository::new(&conn).save(sample_order()).unwrap();

        assert_eq!(count_rows(&conn, "taco_order").unwrap(), 1);
        assert_eq!(count_rows(&conn, "taco_order_tacos").unwrap(), 0);
    }

    #[test]
    fn test_placed_at_is_overwritten_with_now() {
        let conn = seeded_db();
        let mut order = sample_order();
        order.placed_at = Some(Utc::now() - chrono::Duration::days(30));

        let before = Utc::now();
        let saved = OrderRepository::new(&conn).save(order).unwrap();

        assert!(saved.placed_at.unwrap() >= before);
    }

    #[test]
    fn test_saving_twice_is_rejected() {
        let conn = seeded_db();
        let repo = OrderRepository::new(&conn);
        let saved = repo.save(sample_order()).unwrap();
        let id = saved.id.unwrap();

        match repo.save(saved) {
            Err(OrderError::AlreadySaved(existing)) => assert_eq!(existing, id),
            other => panic!("expected AlreadySaved, got {:?}", other),
        }
        assert_eq!(count_rows(&conn, "taco_order").unwrap(), 1);
    }

    #[test]
    fn test_unsaved_taco_fails_before_any_write() {
        let conn = seeded_db();
        let mut order = sample_order();
        order.add_taco(saved_taco(&conn, "Saved"));
        order.add_taco(Taco::new("Draft", Vec::new()));

        match OrderRepository::new(&conn).save(order) {
            Err(OrderError::UnsavedTaco { position }) => assert_eq!(position, 1),
            other => panic!("expected UnsavedTaco, got {:?}", other),
        }
        assert_eq!(count_rows(&conn, "taco_order").unwrap(), 0);
    }

    #[test]
    fn test_failed_association_rolls_back_header() {
        let conn = seeded_db();
        let good = saved_taco(&conn, "Good");
        let mut missing = Taco::new("Ghost", Vec::new());
        missing.id = Some(9_999);

        let mut order = sample_order();
        order.add_taco(good);
        order.add_taco(missing);

        let result = OrderRepository::new(&conn).save(order);

        assert!(matches!(result, Err(OrderError::Storage(_))));
        assert_eq!(count_rows(&conn, "taco_order").unwrap(), 0);
        assert_eq!(count_rows(&conn, "taco_order_tacos").unwrap(), 0);
    }

    #[test]
    fn test_find_by_id_round_trip() {
        let conn = seeded_db();
        let taco = saved_taco(&conn, "Lunch");
        let mut order = sample_order();
        order.add_taco(taco.clone());
        order.add_taco(taco.clone());

        let repo = OrderRepository::new(&conn);
        let saved = repo.save(order).unwrap();
        let loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();

        assert_eq!(loaded.delivery_name, "Craig Walls");
        assert_eq!(loaded.tacos.len(), 2);
        assert_eq!(loaded.tacos[0].id, taco.id);
        assert!(repo.find_by_id(12_345).unwrap().is_none());
    }
}
