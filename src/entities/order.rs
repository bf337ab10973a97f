// 🧾 Order Entity - delivery/payment header plus an ordered list of tacos
//
// The header is flattened into an explicit column record for insertion. Every
// persisted column is listed in `to_record`, so the insert shape is reviewable
// in one place instead of being derived at runtime.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::Taco;
use crate::db::format_timestamp;

/// Column name → value pairs for a single insert
pub type Record = Vec<(&'static str, Value)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacoOrder {
    /// Store-generated key; `None` until the first save
    #[serde(default)]
    pub id: Option<i64>,

    /// Stamped by the save routine; `None` until the first save
    #[serde(default)]
    pub placed_at: Option<DateTime<Utc>>,

    // ========================================================================
    // DELIVERY
    // ========================================================================
    pub delivery_name: String,
    pub delivery_street: String,
    pub delivery_city: String,
    pub delivery_state: String,
    pub delivery_zip: String,

    // ========================================================================
    // PAYMENT
    // ========================================================================
    pub cc_number: String,
    pub cc_expiration: String,
    pub cc_cvv: String,

    #[serde(default)]
    pub tacos: Vec<Taco>,
}

impl TacoOrder {
    pub fn add_taco(&mut self, taco: Taco) {
        self.tacos.push(taco);
    }

    /// Flatten the header into `taco_order` columns.
    ///
    /// `placed_at` is always present in the record; it is NULL only if the
    /// order was never stamped, which the NOT NULL column then rejects.
    pub fn to_record(&self) -> Record {
        vec![
            ("delivery_name", Value::Text(self.delivery_name.clone())),
            ("delivery_street", Value::Text(self.delivery_street.clone())),
            ("delivery_city", Value::Text(self.delivery_city.clone())),
            ("delivery_state", Value::Text(self.delivery_state.clone())),
            ("delivery_zip", Value::Text(self.delivery_zip.clone())),
            ("cc_number", Value::Text(self.cc_number.clone())),
            ("cc_expiration", Value::Text(self.cc_expiration.clone())),
            ("cc_cvv", Value::Text(self.cc_cvv.clone())),
            (
                "placed_at",
                self.placed_at
                    .as_ref()
                    .map(|ts| Value::Text(format_timestamp(ts)))
                    .unwrap_or(Value::Null),
            ),
        ]
    }
}
