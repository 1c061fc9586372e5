use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

use crate::pricing::PricingError;

#[derive(Error, Debug)]
pub enum FactureError {
    #[error("Config directory not found at {0}. Run 'facture init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Client '{0}' not found in clients.toml")]
    ClientNotFound(String),

    #[error("Item '{0}' not found in items.toml")]
    ItemNotFound(String),

    #[error("Invalid quantity '{qty}' for item '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("Invalid discount '{value}' for item '{item}': must be a percentage between 0 and 100")]
    InvalidDiscount { item: String, value: String },

    #[error("Invalid item format '{0}'. Expected 'item:quantity' or 'item:quantity:discount' (e.g., 'conseil:8' or 'conseil:8:10')")]
    InvalidItemFormat(String),

    #[error("No items specified. Use --item <name>:<quantity>[:<discount>] to add line items.")]
    NoItems,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Document '{0}' not found in history")]
    DocumentNotFound(String),

    #[error("Invalid document index '{0}'. Use 'facture list' to see available documents.")]
    InvalidDocumentIndex(String),

    #[error("Document '{0}' has no stored items (generated before item tracking was added)")]
    NoStoredItems(String),

    #[error("Document file not found: {0}")]
    DocumentFileNotFound(PathBuf),

    #[error("'{0}' is a devis, not a facture")]
    NotAFacture(String),

    #[error("'{0}' is already a facture; only a devis can be converted")]
    NotADevis(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Payment would exceed facture total ({max} remaining)")]
    OverPayment { facture: String, max: Decimal },

    #[error("No payments recorded for {0}")]
    NoPayments(String),

    #[error("Invalid payment index {index} for {facture} (only {count} payment(s) recorded)")]
    InvalidPaymentIndex {
        facture: String,
        index: usize,
        count: usize,
    },

    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    #[error("Invalid --status value: '{0}'. Use 'paid', 'unpaid', or 'partial'.")]
    InvalidStatusFilter(String),
}

pub type Result<T> = std::result::Result<T, FactureError>;
