// 🧾 Receipt Model
// Wire shape of a submitted receipt plus the stored, identified form

use crate::error::ScoreError;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

// ============================================================================
// AMOUNT
// ============================================================================

/// Monetary amount exactly as it was submitted.
///
/// Accepts either a JSON string (`"35.35"`) or a JSON number (`35.35`).
/// The text is only turned into a `Decimal` when a rule needs it, so a
/// receipt with a garbled price is still stored and scored by the other rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount(String);

impl Amount {
    pub fn new(raw: impl Into<String>) -> Self {
        Amount(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as an exact decimal. `field` names the amount in the error.
    pub fn to_decimal(&self, field: &'static str) -> Result<Decimal, ScoreError> {
        let raw = self.0.trim();
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| ScoreError::InvalidAmount {
                field,
                value: self.0.clone(),
            })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        // arbitrary_precision keeps a JSON number's original digits in `Number`
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(Amount(text)),
            Value::Number(number) => Ok(Amount(number.to_string())),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a decimal amount as a string or number",
            )),
        }
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
        Value::String(s) => Unexpected::Str(s),
        Value::Number(_) => Unexpected::Other("number"),
    }
}

// ============================================================================
// ITEM & RECEIPT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub short_description: String,
    pub price: Amount,
}

impl Item {
    pub fn new(short_description: impl Into<String>, price: impl Into<String>) -> Self {
        Item {
            short_description: short_description.into(),
            price: Amount::new(price),
        }
    }
}

/// Body of `POST /receipts/process`. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceipt {
    pub retailer: String,
    pub purchase_date: String,
    pub purchase_time: String,
    pub total: Amount,
    pub items: Vec<Item>,
}

/// A receipt accepted by the store. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    id: Uuid,
    #[serde(flatten)]
    data: NewReceipt,
}

impl Receipt {
    pub fn new(id: Uuid, data: NewReceipt) -> Self {
        Receipt { id, data }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data(&self) -> &NewReceipt {
        &self.data
    }
}

impl NewReceipt {
    pub fn purchase_date(&self) -> Result<NaiveDate, ScoreError> {
        NaiveDate::parse_from_str(self.purchase_date.trim(), DATE_FORMAT)
            .map_err(|_| ScoreError::InvalidDate(self.purchase_date.clone()))
    }

    pub fn purchase_time(&self) -> Result<NaiveTime, ScoreError> {
        NaiveTime::parse_from_str(self.purchase_time.trim(), TIME_FORMAT)
            .map_err(|_| ScoreError::InvalidTime(self.purchase_time.clone()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
