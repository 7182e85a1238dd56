//! Batch builders for the two demo variants.

use crate::models::{Price, Row, RowId};
use rand::RngExt;

/// Deterministic batch used by the streaming variant: price is `id * 10`.
pub fn fixed_batch(size: u32) -> Vec<Row> {
    (1..=size)
        .map(|id| Row::new(id, u64::from(id) * 10))
        .collect()
}

/// Fresh batch with random prices in `[0, 100)` rounded to cents.
pub fn random_batch<R: RngExt + ?Sized>(size: u32, rng: &mut R) -> Vec<Row> {
    (1..=size)
        .map(|id| Row::new(id, random_price(rng)))
        .collect()
}

fn random_price<R: RngExt + ?Sized>(rng: &mut R) -> Price {
    let raw: f64 = rng.random::<f64>() * 100.0;
    Price::Decimal((raw * 100.0).round() / 100.0)
}

/// Slow column produced by the streaming variant.
pub fn computed_value(id: RowId) -> String {
    format!("Computed-{}", id)
}

/// Slow column produced by the polling variant's background work.
pub fn slow_value(id: RowId) -> String {
    format!("SlowValue-{}", id)
}
