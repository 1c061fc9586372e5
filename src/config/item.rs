use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog entry from items.toml. Discount is not part of the catalog;
/// it is given per line on the command line.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Item {
    pub description: String,
    pub unit_price: Decimal,
    /// TVA percent (0–100). Zero for exempt items.
    #[serde(default)]
    pub tax_rate: Decimal,
    pub unit: String,
}
