//! Line-item pricing for devis and factures.
//!
//! Pure arithmetic over line items: no I/O, no state. All money math is
//! exact `Decimal`; rounding happens at the display boundary (see the
//! `money` module), never here. Discount is applied before tax ("remise
//! puis TVA"): tax is computed on the discounted base.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

const HUNDRED: Decimal = dec!(100);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Quantity for '{description}' must not be negative (got {quantity})")]
    NegativeQuantity { description: String, quantity: i64 },

    #[error("Unit price for '{description}' must not be negative (got {unit_price})")]
    NegativeUnitPrice {
        description: String,
        unit_price: Decimal,
    },

    #[error("Discount rate for '{description}' must be between 0 and 100 (got {rate})")]
    DiscountRateOutOfRange { description: String, rate: Decimal },

    #[error("Tax rate for '{description}' must be between 0 and 100 (got {rate})")]
    TaxRateOutOfRange { description: String, rate: Decimal },
}

/// A single row of a devis or facture, before pricing.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// Percent, 0–100.
    pub discount_rate: Decimal,
    /// Percent, 0–100.
    pub tax_rate: Decimal,
}

/// Computed amounts for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxable_base: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Document-level aggregates over all lines.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl DocumentTotals {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

fn validate(item: &LineItem) -> Result<(), PricingError> {
    if item.quantity < 0 {
        return Err(PricingError::NegativeQuantity {
            description: item.description.clone(),
            quantity: item.quantity,
        });
    }
    if item.unit_price < Decimal::ZERO {
        return Err(PricingError::NegativeUnitPrice {
            description: item.description.clone(),
            unit_price: item.unit_price,
        });
    }
    if item.discount_rate < Decimal::ZERO || item.discount_rate > HUNDRED {
        return Err(PricingError::DiscountRateOutOfRange {
            description: item.description.clone(),
            rate: item.discount_rate,
        });
    }
    if item.tax_rate < Decimal::ZERO || item.tax_rate > HUNDRED {
        return Err(PricingError::TaxRateOutOfRange {
            description: item.description.clone(),
            rate: item.tax_rate,
        });
    }
    Ok(())
}

/// Price a single line: subtotal, discount, taxable base, tax, total.
///
/// Rejects negative quantities/prices and out-of-range rates instead of
/// clamping; an invalid input has no meaningful total.
pub fn price_line(item: &LineItem) -> Result<LineTotals, PricingError> {
    validate(item)?;

    let subtotal = Decimal::from(item.quantity) * item.unit_price;
    let discount = subtotal * item.discount_rate / HUNDRED;
    let taxable_base = subtotal - discount;
    let tax = taxable_base * item.tax_rate / HUNDRED;
    let total = taxable_base + tax;

    Ok(LineTotals {
        subtotal,
        discount,
        taxable_base,
        tax,
        total,
    })
}

/// Price a whole document: field-wise sums of per-line results.
///
/// An empty slice is a valid document with all-zero totals; whether an
/// empty devis/facture is acceptable is the caller's call.
pub fn price_document(items: &[LineItem]) -> Result<DocumentTotals, PricingError> {
    let mut totals = DocumentTotals::zero();

    for item in items {
        let line = price_line(item)?;
        totals.subtotal += line.subtotal;
        totals.discount += line.discount;
        totals.tax += line.tax;
        totals.total += line.total;
    }

    Ok(totals)
}
