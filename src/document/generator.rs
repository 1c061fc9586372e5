use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::{
    load_clients, load_config, load_items, load_state, resolve_output_dir, save_state, Client,
    Company, Config, HistoryEntry, Item,
};
use crate::error::{FactureError, Result};
use crate::money::{format_money, format_percent, round_money};
use crate::pdf::generate_pdf;
use crate::pricing::{price_document, price_line, LineItem};

use super::DocumentKind;

/// One rendered row of the PDF. All amounts arrive pre-formatted; the
/// Typst template never does money math.
#[derive(Debug, Serialize)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: i64,
    pub unit: String,
    pub unit_price: String,
    pub discount_rate: String,
    pub tax_rate: String,
    pub total: String,
}

/// Complete document data for PDF generation
#[derive(Debug, Serialize)]
pub struct DocumentData {
    pub number: String,
    pub kind_label: String,
    pub date: String,
    pub due_label: String,
    pub due_date: String,
    pub company: Company,
    pub client: Client,
    pub lines: Vec<DocumentLine>,
    pub subtotal: String,
    pub discount: String,
    pub has_discount: bool,
    pub tax: String,
    pub has_tax: bool,
    pub total: String,
    pub payment_terms: Option<String>,
}

/// Parse item input like "conseil:8" or "conseil:8:10" into
/// (item_id, quantity, discount percent).
fn parse_item_input(input: &str) -> Result<(&str, i64, Decimal)> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(FactureError::InvalidItemFormat(input.to_string()));
    }

    let item_id = parts[0];
    let qty_str = parts[1];

    let quantity: i64 = qty_str.parse().map_err(|_| FactureError::InvalidQuantity {
        item: item_id.to_string(),
        qty: qty_str.to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if quantity < 1 {
        return Err(FactureError::InvalidQuantity {
            item: item_id.to_string(),
            qty: qty_str.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let discount = match parts.get(2) {
        Some(raw) => {
            let value: Decimal = raw.parse().map_err(|_| FactureError::InvalidDiscount {
                item: item_id.to_string(),
                value: raw.to_string(),
            })?;
            if value < Decimal::ZERO || value > Decimal::from(100) {
                return Err(FactureError::InvalidDiscount {
                    item: item_id.to_string(),
                    value: raw.to_string(),
                });
            }
            value
        }
        None => Decimal::ZERO,
    };

    Ok((item_id, quantity, discount))
}

/// Resolve item inputs against the catalog into engine line items, paired
/// with the catalog unit for display.
fn resolve_lines(
    catalog: &HashMap<String, Item>,
    inputs: &[String],
) -> Result<Vec<(LineItem, String)>> {
    let mut lines = Vec::with_capacity(inputs.len());

    for input in inputs {
        let (item_id, quantity, discount) = parse_item_input(input)?;

        let item = catalog
            .get(item_id)
            .ok_or_else(|| FactureError::ItemNotFound(item_id.to_string()))?;

        lines.push((
            LineItem {
                description: item.description.clone(),
                quantity,
                unit_price: item.unit_price,
                discount_rate: discount,
                tax_rate: item.tax_rate,
            },
            item.unit.clone(),
        ));
    }

    Ok(lines)
}

/// Format document number from template
fn format_document_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}

fn number_format_for(config: &Config, kind: DocumentKind) -> &str {
    match kind {
        DocumentKind::Devis => &config.document.devis_number_format,
        DocumentKind::Facture => &config.document.facture_number_format,
    }
}

/// Build the PDF payload for a document dated `date`.
fn build_document_data(
    kind: DocumentKind,
    number: &str,
    date: NaiveDate,
    config: &Config,
    client: &Client,
    lines: &[(LineItem, String)],
) -> Result<DocumentData> {
    let items: Vec<LineItem> = lines.iter().map(|(line, _)| line.clone()).collect();
    let totals = price_document(&items)?;
    let label = config.document.currency_label.as_str();

    let rows = lines
        .iter()
        .map(|(line, unit)| {
            let line_totals = price_line(line)?;
            Ok(DocumentLine {
                description: line.description.clone(),
                quantity: line.quantity,
                unit: unit.clone(),
                unit_price: format_money(line.unit_price, label),
                discount_rate: format_percent(line.discount_rate),
                tax_rate: format_percent(line.tax_rate),
                total: format_money(line_totals.total, label),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let due_days = config.document.due_days;
    let due_date = date
        .checked_add_signed(chrono::Duration::days(due_days as i64))
        .unwrap_or(date);

    let (due_label, payment_terms) = match kind {
        DocumentKind::Devis => ("Valable jusqu'au".to_string(), None),
        DocumentKind::Facture => (
            "Échéance".to_string(),
            Some(format!("Paiement à {due_days} jours")),
        ),
    };

    Ok(DocumentData {
        number: number.to_string(),
        kind_label: kind.label().to_string(),
        date: date.format("%d/%m/%Y").to_string(),
        due_label,
        due_date: due_date.format("%d/%m/%Y").to_string(),
        company: config.company.clone(),
        client: client.clone(),
        lines: rows,
        subtotal: format_money(totals.subtotal, label),
        discount: format_money(totals.discount, label),
        has_discount: !totals.discount.is_zero(),
        tax: format_money(totals.tax, label),
        has_tax: !totals.tax.is_zero(),
        total: format_money(totals.total, label),
        payment_terms,
    })
}

/// Generate a new devis or facture
pub fn generate_document(
    cfg_dir: &PathBuf,
    kind: DocumentKind,
    client_id: &str,
    items_input: &[String],
    output_path: Option<PathBuf>,
) -> Result<()> {
    // Load all config
    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let catalog = load_items(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    // Look up client
    let client = clients
        .get(client_id)
        .ok_or_else(|| FactureError::ClientNotFound(client_id.to_string()))?
        .clone();

    // Parse, validate and price the lines
    let lines = resolve_lines(&catalog, items_input)?;
    let items: Vec<LineItem> = lines.iter().map(|(line, _)| line.clone()).collect();
    let totals = price_document(&items)?;

    // Determine document number
    let today = Local::now().date_naive();
    let current_year = today.year() as u32;
    let seq = state.next_seq(kind, current_year);
    let number = format_document_number(number_format_for(&config, kind), current_year, seq);

    let data = build_document_data(kind, &number, today, &config, &client, &lines)?;

    // Determine output path
    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    std::fs::create_dir_all(&output_dir)?;

    let pdf_filename = format!("{number}.pdf");
    let pdf_path = output_path.unwrap_or_else(|| output_dir.join(&pdf_filename));

    // Generate PDF
    generate_pdf(&data, &pdf_path)?;

    // Update state
    let counter = state.counter_mut(kind);
    counter.last_number = seq;
    counter.last_year = current_year;
    state.history.push(HistoryEntry {
        number: number.clone(),
        kind,
        client: client_id.to_string(),
        date: today,
        total: round_money(totals.total),
        file: pdf_filename,
        items: items_input.to_vec(),
        payments: Vec::new(),
    });

    save_state(cfg_dir, &state)?;

    // Print summary
    println!("Generated {number}");
    println!("  Client: {}", client.name);
    println!(
        "  Total:  {}",
        format_money(totals.total, &config.document.currency_label)
    );
    println!("  Saved:  {}", pdf_path.display());

    Ok(())
}

/// Regenerate an existing document from stored data
pub fn regenerate_document(
    cfg_dir: &PathBuf,
    number: &str,
    new_items: Option<&[String]>,
) -> Result<PathBuf> {
    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let catalog = load_items(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    // Find the document in history
    let entry_idx = state
        .history
        .iter()
        .position(|e| e.number == number)
        .ok_or_else(|| FactureError::DocumentNotFound(number.to_string()))?;

    let entry = &state.history[entry_idx];
    let kind = entry.kind;
    let client_id = entry.client.clone();
    let original_date = entry.date;

    // Use new items if provided, otherwise use stored items
    let items_to_use: Vec<String> = match new_items {
        Some(items) => items.to_vec(),
        None => {
            if entry.items.is_empty() {
                return Err(FactureError::NoStoredItems(number.to_string()));
            }
            entry.items.clone()
        }
    };

    // Look up client
    let client = clients
        .get(&client_id)
        .ok_or_else(|| FactureError::ClientNotFound(client_id.clone()))?
        .clone();

    let lines = resolve_lines(&catalog, &items_to_use)?;
    let items: Vec<LineItem> = lines.iter().map(|(line, _)| line.clone()).collect();
    let totals = price_document(&items)?;

    let data = build_document_data(kind, number, original_date, &config, &client, &lines)?;

    // Determine output path
    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    std::fs::create_dir_all(&output_dir)?;

    let pdf_filename = format!("{number}.pdf");
    let pdf_path = output_dir.join(&pdf_filename);

    // Generate PDF
    generate_pdf(&data, &pdf_path)?;

    // Update history entry if items changed
    if new_items.is_some() {
        state.history[entry_idx].items = items_to_use;
        state.history[entry_idx].total = round_money(totals.total);
        save_state(cfg_dir, &state)?;
    }

    Ok(pdf_path)
}

/// Create a new facture from a stored devis' client and items.
pub fn convert_devis(cfg_dir: &PathBuf, devis_number: &str) -> Result<String> {
    let state = load_state(cfg_dir)?;

    let entry = state
        .find(devis_number)
        .ok_or_else(|| FactureError::DocumentNotFound(devis_number.to_string()))?;

    if entry.kind != DocumentKind::Devis {
        return Err(FactureError::NotADevis(devis_number.to_string()));
    }
    if entry.items.is_empty() {
        return Err(FactureError::NoStoredItems(devis_number.to_string()));
    }

    let client_id = entry.client.clone();
    let items = entry.items.clone();
    drop(state);

    generate_document(cfg_dir, DocumentKind::Facture, &client_id, &items, None)?;

    // The facture just generated is the newest history entry
    let state = load_state(cfg_dir)?;
    state
        .history
        .last()
        .map(|e| e.number.clone())
        .ok_or_else(|| FactureError::DocumentNotFound("latest".to_string()))
}

/// Get the PDF path for a document
pub fn get_document_path(cfg_dir: &PathBuf, number: &str) -> Result<PathBuf> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let entry = state
        .find(number)
        .ok_or_else(|| FactureError::DocumentNotFound(number.to_string()))?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let pdf_path = output_dir.join(&entry.file);

    if !pdf_path.exists() {
        return Err(FactureError::DocumentFileNotFound(pdf_path));
    }

    Ok(pdf_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_plain_and_discounted_inputs() {
        assert_eq!(parse_item_input("conseil:8").unwrap(), ("conseil", 8, Decimal::ZERO));
        assert_eq!(
            parse_item_input("conseil:8:10").unwrap(),
            ("conseil", 8, dec!(10))
        );
        assert_eq!(
            parse_item_input("forfait:1:2.5").unwrap(),
            ("forfait", 1, dec!(2.5))
        );
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert!(matches!(
            parse_item_input("conseil").unwrap_err(),
            FactureError::InvalidItemFormat(_)
        ));
        assert!(matches!(
            parse_item_input("conseil:abc").unwrap_err(),
            FactureError::InvalidQuantity { .. }
        ));
        assert!(matches!(
            parse_item_input("conseil:0").unwrap_err(),
            FactureError::InvalidQuantity { .. }
        ));
        assert!(matches!(
            parse_item_input("conseil:8:150").unwrap_err(),
            FactureError::InvalidDiscount { .. }
        ));
        assert!(matches!(
            parse_item_input("conseil:8:dix").unwrap_err(),
            FactureError::InvalidDiscount { .. }
        ));
    }

    #[test]
    fn number_formats_per_kind() {
        assert_eq!(
            format_document_number("DEV-{year}-{seq:04}", 2026, 7),
            "DEV-2026-0007"
        );
        assert_eq!(
            format_document_number("FAC-{year}-{seq:03}", 2026, 12),
            "FAC-2026-012"
        );
    }
}
