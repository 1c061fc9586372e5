pub mod config;
pub mod document;
pub mod error;
pub mod money;
pub mod pdf;
pub mod pricing;

pub use config::{Client, Company, Config, GlobalConfig, HistoryEntry, Item, State};
pub use document::{generate_document, DocumentData, DocumentKind};
pub use error::{FactureError, Result};
pub use pricing::{price_document, price_line, DocumentTotals, LineItem, LineTotals, PricingError};
