use serde::{Deserialize, Serialize};

/// Row identifiers are dense and start at 1 within a batch.
pub type RowId = u32;

/// Price column. Whole prices serialize without a fractional part
/// (`10`), decimal prices as JSON floats (`42.17`, `42.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Whole(u64),
    Decimal(f64),
}

impl Price {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Price::Whole(value) => value as f64,
            Price::Decimal(value) => value,
        }
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Price::Whole(value)
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price::Decimal(value)
    }
}

/// A table row as returned by the polling endpoint.
///
/// `slow_value` is serialized as `null` until the slow column is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub name: String,
    pub price: Price,
    pub slow_value: Option<String>,
}

/// Fast columns of a row, payload element of the `fast` stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastRow {
    pub id: RowId,
    pub name: String,
    pub price: Price,
}

/// Slow column of a row, payload element of the `slow` stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowRow {
    pub id: RowId,
    pub slow_value: String,
}

/// Body of `GET /slow-value/{row_id}`.
///
/// The id is echoed as received, so it is wider than [`RowId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowValueResponse {
    pub id: i64,
    pub slow_value: Option<String>,
}

impl Row {
    pub fn new(id: RowId, price: impl Into<Price>) -> Self {
        Self {
            id,
            name: format!("Item {}", id),
            price: price.into(),
            slow_value: None,
        }
    }

    pub fn fast(&self) -> FastRow {
        FastRow {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
        }
    }

    pub fn with_slow_value(mut self, slow_value: impl Into<String>) -> Self {
        self.slow_value = Some(slow_value.into());
        self
    }

    /// Slow projection, `None` while the slow column is still missing.
    pub fn slow(&self) -> Option<SlowRow> {
        self.slow_value.as_ref().map(|value| SlowRow {
            id: self.id,
            slow_value: value.clone(),
        })
    }
}

impl SlowValueResponse {
    pub fn pending(id: i64) -> Self {
        Self {
            id,
            slow_value: None,
        }
    }

    pub fn ready(id: i64, slow_value: impl Into<String>) -> Self {
        Self {
            id,
            slow_value: Some(slow_value.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.slow_value.is_some()
    }
}
