mod config;
mod document;
mod error;
mod money;
mod pdf;
mod pricing;

use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::config::{
    config_dir, global_config_file, load_clients, load_config, load_global_config, load_items,
    load_state, save_state,
    state::{Payment, PaymentStatus},
    CLIENTS_TEMPLATE, CONFIG_TEMPLATE, ITEMS_TEMPLATE,
};
use crate::document::{
    convert_devis, generate_document, get_document_path, regenerate_document, DocumentKind,
};
use crate::error::{FactureError, Result};
use crate::money::{format_money, format_percent, format_whole_money, round_money, XAF_PER_EUR};

#[derive(Parser)]
#[command(name = "facture")]
#[command(version, about = "Minimal CLI for quotes and invoices (devis & factures)", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.facture or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Devis,
    Facture,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Devis => DocumentKind::Devis,
            KindArg::Facture => DocumentKind::Facture,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Generate a new devis (quote)
    Devis {
        /// Client identifier from clients.toml
        #[arg(short, long)]
        client: String,

        /// Line items in format "item:quantity[:discount%]" (can be repeated)
        #[arg(short, long, value_name = "ITEM:QTY[:DISC]")]
        item: Vec<String>,

        /// Custom output file path (default: output_dir/DEV-XXXX.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Generate a new facture (invoice)
    Facture {
        /// Client identifier from clients.toml
        #[arg(short, long)]
        client: String,

        /// Line items in format "item:quantity[:discount%]" (can be repeated)
        #[arg(short, long, value_name = "ITEM:QTY[:DISC]")]
        item: Vec<String>,

        /// Custom output file path (default: output_dir/FAC-XXXX.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Create a facture from an existing devis
    Convert {
        /// Devis number or index from 'list' (e.g., 1 or DEV-2026-0001)
        devis: String,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// List configured clients
    Clients,

    /// List catalog items
    Items,

    /// Show document status and next numbers
    Status {
        /// Show global config information
        #[arg(short, long)]
        verbose: bool,
    },

    /// List generated documents
    List {
        /// Number of documents to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only show one document kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Edit an existing document's line items
    Edit {
        /// Document number or index from 'list' (e.g., 1 or FAC-2026-0001)
        document: String,

        /// New line items in format "item:quantity[:discount%]" (replaces existing items)
        #[arg(short, long, value_name = "ITEM:QTY[:DISC]")]
        item: Vec<String>,
    },

    /// Open a document PDF
    Open {
        /// Document number or index from 'list' (e.g., 1 or FAC-2026-0001)
        document: String,
    },

    /// Regenerate a document PDF from stored data
    Regenerate {
        /// Document number or index from 'list' (e.g., 1 or FAC-2026-0001)
        document: String,

        /// Open regenerated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Record a payment against a facture
    AddPayment {
        /// Facture number or index from 'list' (e.g., 1 or FAC-2026-0001)
        facture: String,

        /// Payment amount in the configured currency
        amount: Decimal,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Remove a payment from a facture
    RemovePayment {
        /// Facture number or index from 'list' (e.g., 1 or FAC-2026-0001)
        facture: String,

        /// 1-based index of payment to remove (default: last)
        #[arg(long)]
        index: Option<usize>,
    },

    /// Show payment history for a facture
    Payments {
        /// Facture number or index from 'list' (e.g., 1 or FAC-2026-0001)
        facture: String,
    },

    /// Show a facture summary for a client
    Report {
        /// Client identifier from clients.toml
        #[arg(short, long)]
        client: String,

        /// Filter factures from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter factures to this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Filter by payment status (paid, unpaid, partial)
        #[arg(long)]
        status: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Devis {
            client,
            item,
            output,
            open,
        } => cmd_generate(&cfg_dir, DocumentKind::Devis, &client, &item, output, open),
        Commands::Facture {
            client,
            item,
            output,
            open,
        } => cmd_generate(&cfg_dir, DocumentKind::Facture, &client, &item, output, open),
        Commands::Convert { devis, open } => cmd_convert(&cfg_dir, &devis, open),
        Commands::Clients => cmd_clients(&cfg_dir),
        Commands::Items => cmd_items(&cfg_dir),
        Commands::Status { verbose } => cmd_status(&cfg_dir, verbose),
        Commands::List { limit, kind } => cmd_list(&cfg_dir, limit, kind.map(Into::into)),
        Commands::Edit { document, item } => cmd_edit(&cfg_dir, &document, &item),
        Commands::Open { document } => cmd_open(&cfg_dir, &document),
        Commands::Regenerate { document, open } => cmd_regenerate(&cfg_dir, &document, open),
        Commands::AddPayment {
            facture,
            amount,
            date,
        } => cmd_add_payment(&cfg_dir, &facture, amount, date),
        Commands::RemovePayment { facture, index } => {
            cmd_remove_payment(&cfg_dir, &facture, index)
        }
        Commands::Payments { facture } => cmd_payments(&cfg_dir, &facture),
        Commands::Report {
            client,
            from,
            to,
            status,
        } => cmd_report(&cfg_dir, &client, from, to, status),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(FactureError::AlreadyInitialized(cfg_dir.clone()));
    }

    // Create directories
    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    // Write template files
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("clients.toml"), CLIENTS_TEMPLATE)?;
    fs::write(cfg_dir.join("items.toml"), ITEMS_TEMPLATE)?;

    println!("Initialized facture config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your clients:           $EDITOR {}/clients.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Configure catalog items:    $EDITOR {}/items.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then generate your first devis or facture:");
    println!("  facture devis --client <client-id> --item <item>:<quantity>[:<discount%>]");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "UNIT PRICE")]
    unit_price: String,
    #[tabled(rename = "TVA")]
    tax_rate: String,
    #[tabled(rename = "UNIT")]
    unit: String,
}

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CLIENT")]
    client: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "OUTSTANDING")]
    outstanding: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

/// Append a merged financial footer (TOTAL / PAID / OUTSTANDING) to the
/// rounded `list` table. The first four columns (#, NUMBER, KIND, DATE)
/// become one label cell; TOTAL keeps its width; STATUS and CLIENT are
/// closed off.
fn add_financial_footer(table: &str, total: &str, paid: &str, outstanding: &str) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < 7 {
        return table.to_string();
    }

    let left_width = widths[0] + widths[1] + widths[2] + widths[3] + 3; // +3 for the three ┴ replaced by spaces
    let total_width = widths[4];
    let status_width = widths[5];
    let client_width = widths[6];

    let rows = [
        ("TOTAL", total),
        ("(-) PAID", paid),
        ("(=) OUTSTANDING", outstanding),
    ];

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    // First separator: merge left 4 columns, keep TOTAL, close off STATUS+CLIENT
    out.push_str(&format!(
        "├{}┴{}┴{}┴{}┼{}┼{}┴{}╯\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(widths[3]),
        "─".repeat(total_width),
        "─".repeat(status_width),
        "─".repeat(client_width),
    ));

    // Summary rows with separators between them
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>total$} │\n",
            label,
            value,
            left = left_width - 2,
            total = total_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(total_width)
            ));
        }
    }

    // Bottom border
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(total_width)
    ));

    out
}

/// List configured clients
fn cmd_clients(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let clients = load_clients(cfg_dir)?;

    if clients.is_empty() {
        println!("No clients configured.");
        println!("Add clients to: {}/clients.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = clients.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ClientRow> = sorted
        .iter()
        .map(|(id, client)| ClientRow {
            id: id.to_string(),
            name: client.name.clone(),
            email: client.email.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// List catalog items
fn cmd_items(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let items = load_items(cfg_dir)?;

    if items.is_empty() {
        println!("No items configured.");
        println!("Add items to: {}/items.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = items.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let label = config.document.currency_label.as_str();
    let rows: Vec<ItemRow> = sorted
        .iter()
        .map(|(id, item)| ItemRow {
            id: id.to_string(),
            description: item.description.clone(),
            unit_price: format_money(item.unit_price, label),
            tax_rate: format_percent(item.tax_rate),
            unit: format!("/{}", item.unit),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show document status and next numbers
fn cmd_status(cfg_dir: &PathBuf, show_global: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let items = load_items(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    // Calculate next numbers (counters reset each year)
    let current_year = chrono::Utc::now().year() as u32;
    let next_devis = format_number(
        &config.document.devis_number_format,
        current_year,
        state.next_seq(DocumentKind::Devis, current_year),
    );
    let next_facture = format_number(
        &config.document.facture_number_format,
        current_year,
        state.next_seq(DocumentKind::Facture, current_year),
    );

    println!("Facture Status");
    println!("{}", "-".repeat(50));

    // Show global config info if requested or if it exists
    let global_path = global_config_file();
    let global = load_global_config();
    if show_global || global.config_dir.is_some() {
        if global_path.exists() {
            println!("Global config:    {} (active)", global_path.display());
        } else {
            println!("Global config:    {} (not found)", global_path.display());
        }
    }

    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    println!("Clients:          {}", clients.len());
    println!("Items:            {}", items.len());
    println!("Next devis:       {next_devis}");
    println!("Next facture:     {next_facture}");

    if !state.history.is_empty() {
        println!();
        println!("Recent documents:");
        for entry in state.history.iter().rev().take(5) {
            println!(
                "  {} ({}) - {} - {}",
                entry.number,
                entry.kind,
                entry.client,
                format_money(entry.total, &config.document.currency_label)
            );
        }
    }

    Ok(())
}

/// Format document number from template
fn format_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}

/// Fetch the current EUR→USD exchange rate from the Frankfurter API.
/// The XAF side is a fixed peg, so only the euro leg is looked up.
/// Returns None on any failure (network, timeout, parse error) so the
/// caller can silently skip the USD line.
fn fetch_eur_to_usd_rate() -> Option<f64> {
    use std::time::Duration;
    use ureq::Agent;

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(3)))
        .build()
        .into();

    let body: String = agent
        .get("https://api.frankfurter.dev/v1/latest?base=EUR&symbols=USD")
        .call()
        .ok()?
        .body_mut()
        .read_to_string()
        .ok()?;

    let json: serde_json::Value = serde_json::from_str(&body).ok()?;
    json["rates"]["USD"].as_f64()
}

/// List generated documents, newest first
fn cmd_list(cfg_dir: &PathBuf, limit: Option<usize>, kind: Option<DocumentKind>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    if state.history.is_empty() {
        println!("No documents generated yet.");
        return Ok(());
    }

    let label = config.document.currency_label.as_str();

    // Indexes are assigned over the full history (newest first) so they
    // stay valid for open/edit/regenerate whatever the filters are
    let documents: Vec<_> = state
        .history
        .iter()
        .rev()
        .enumerate()
        .filter(|(_, e)| kind.map_or(true, |k| e.kind == k))
        .collect();
    let documents = match limit {
        Some(n) => &documents[..n.min(documents.len())],
        None => &documents[..],
    };

    // Derive status from payment records; a devis has nothing to pay
    let rows: Vec<DocumentRow> = documents
        .iter()
        .map(|(idx, entry)| DocumentRow {
            index: idx + 1,
            number: entry.number.clone(),
            kind: entry.kind.to_string(),
            date: entry.date.to_string(),
            total: format_whole_money(entry.total, label),
            status: match entry.kind {
                DocumentKind::Devis => "-".to_string(),
                DocumentKind::Facture => entry.status().to_string(),
            },
            client: entry.client.clone(),
        })
        .collect();

    // Financial summary covers factures only; a devis is not a receivable
    let factures: Vec<_> = documents
        .iter()
        .filter(|(_, e)| e.kind == DocumentKind::Facture)
        .collect();
    let shown_total: Decimal = factures.iter().map(|(_, entry)| entry.total).sum();
    let shown_paid: Decimal = factures.iter().map(|(_, entry)| entry.paid_amount()).sum();
    let shown_outstanding = shown_total - shown_paid;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let total_amount = format_whole_money(shown_total, label);
    let paid_amount = format_whole_money(shown_paid, label);
    let outstanding_amount = format_whole_money(shown_outstanding, label);
    let table = add_financial_footer(&table, &total_amount, &paid_amount, &outstanding_amount);

    println!("{table}");

    println!();
    println!("Total: {} documents", state.history.len());

    // Show outstanding amount in EUR (fixed peg) and USD (live rate);
    // the parity only holds for the CFA franc
    if config.document.currency == "XAF" && shown_outstanding > Decimal::ZERO {
        let eur = round_money(shown_outstanding / XAF_PER_EUR);
        println!("Outstanding in EUR: {eur:.2} EUR (parité fixe 1 EUR = 655,957 FCFA)");
        if let Some(rate) = fetch_eur_to_usd_rate() {
            if let Some(eur_f64) = eur.to_f64() {
                println!(
                    "Outstanding in USD: {:.2} USD (1 EUR = {:.4} USD)",
                    eur_f64 * rate,
                    rate
                );
            }
        }
    }

    println!(
        "Use index number with open/edit/regenerate/convert/add-payment (e.g., 'facture open 1')"
    );

    Ok(())
}

/// Resolve a document reference to the actual document number.
/// Accepts either an index (1-based) from 'list' or the full number.
fn resolve_document_number(cfg_dir: &PathBuf, reference: &str) -> Result<String> {
    let state = load_state(cfg_dir)?;

    // Try to parse as an index first
    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 {
            return Err(FactureError::InvalidDocumentIndex(reference.to_string()));
        }
        // Documents are displayed in reverse order (newest first), 1-indexed
        let documents: Vec<_> = state.history.iter().rev().collect();
        if idx > documents.len() {
            return Err(FactureError::InvalidDocumentIndex(reference.to_string()));
        }
        return Ok(documents[idx - 1].number.clone());
    }

    // Otherwise, treat as document number - verify it exists
    if state.history.iter().any(|e| e.number == reference) {
        Ok(reference.to_string())
    } else {
        Err(FactureError::DocumentNotFound(reference.to_string()))
    }
}

/// Generate a new devis or facture
fn cmd_generate(
    cfg_dir: &PathBuf,
    kind: DocumentKind,
    client_id: &str,
    items_input: &[String],
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    if items_input.is_empty() {
        return Err(FactureError::NoItems);
    }

    let output_path = output.clone();
    generate_document(cfg_dir, kind, client_id, items_input, output)?;
    if open {
        let pdf_path = if let Some(path) = output_path {
            path
        } else {
            let state = load_state(cfg_dir)?;
            let number = state
                .history
                .last()
                .map(|entry| entry.number.clone())
                .ok_or_else(|| FactureError::DocumentNotFound("latest".to_string()))?;
            get_document_path(cfg_dir, &number)?
        };
        open_path(&pdf_path)?;
    }
    Ok(())
}

/// Create a facture from an existing devis
fn cmd_convert(cfg_dir: &PathBuf, devis_ref: &str, open: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let devis_number = resolve_document_number(cfg_dir, devis_ref)?;
    let facture_number = convert_devis(cfg_dir, &devis_number)?;

    println!("Converted {devis_number} into {facture_number}");

    if open {
        let pdf_path = get_document_path(cfg_dir, &facture_number)?;
        open_path(&pdf_path)?;
    }

    Ok(())
}

/// Edit an existing document
fn cmd_edit(cfg_dir: &PathBuf, document_ref: &str, items: &[String]) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    if items.is_empty() {
        return Err(FactureError::NoItems);
    }

    let number = resolve_document_number(cfg_dir, document_ref)?;
    let pdf_path = regenerate_document(cfg_dir, &number, Some(items))?;

    println!("Updated {number}");
    println!("  Items:  {}", items.join(", "));
    println!("  Saved:  {}", pdf_path.display());

    // Show new total
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    if let Some(entry) = state.find(&number) {
        println!(
            "  Total:  {}",
            format_money(entry.total, &config.document.currency_label)
        );
    }

    Ok(())
}

/// Open a document PDF
fn cmd_open(cfg_dir: &PathBuf, document_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = resolve_document_number(cfg_dir, document_ref)?;
    let pdf_path = get_document_path(cfg_dir, &number)?;

    open_path(&pdf_path)?;

    println!("Opened {}", pdf_path.display());
    Ok(())
}

fn open_path(pdf_path: &PathBuf) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(FactureError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(FactureError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(FactureError::Io)?;
    }
    Ok(())
}

/// Regenerate a document PDF
fn cmd_regenerate(cfg_dir: &PathBuf, document_ref: &str, open: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = resolve_document_number(cfg_dir, document_ref)?;
    let pdf_path = regenerate_document(cfg_dir, &number, None)?;
    if open {
        open_path(&pdf_path)?;
    }

    println!("Regenerated {number}");
    println!("  Saved: {}", pdf_path.display());

    Ok(())
}

/// Record a payment against a facture
fn cmd_add_payment(
    cfg_dir: &PathBuf,
    facture_ref: &str,
    amount: Decimal,
    date_str: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    // Validate amount
    if amount <= Decimal::ZERO {
        return Err(FactureError::InvalidPaymentAmount);
    }

    let number = resolve_document_number(cfg_dir, facture_ref)?;
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    // Parse payment date (default to today)
    let date = match date_str {
        Some(s) => chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| FactureError::InvalidDate(s))?,
        None => chrono::Local::now().date_naive(),
    };

    let entry = state
        .find_mut(&number)
        .ok_or_else(|| FactureError::DocumentNotFound(number.clone()))?;

    // Only a facture carries payments
    if entry.kind != DocumentKind::Facture {
        return Err(FactureError::NotAFacture(number));
    }

    // Guard against overpayment; Decimal comparison is exact, no epsilon
    let remaining = entry.outstanding();
    if amount > remaining {
        return Err(FactureError::OverPayment {
            facture: number,
            max: round_money(remaining),
        });
    }

    entry.payments.push(Payment { amount, date });
    let new_outstanding = entry.outstanding();
    let fac_number = entry.number.clone();

    save_state(cfg_dir, &state)?;

    // Print confirmation
    let label = config.document.currency_label.as_str();
    if new_outstanding <= Decimal::ZERO {
        println!(
            "Recorded {} payment for {fac_number} (fully paid)",
            format_money(amount, label)
        );
    } else {
        println!(
            "Recorded {} payment for {fac_number} ({} remaining)",
            format_money(amount, label),
            format_money(new_outstanding, label)
        );
    }

    Ok(())
}

/// Remove a payment from a facture
fn cmd_remove_payment(cfg_dir: &PathBuf, facture_ref: &str, index: Option<usize>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = resolve_document_number(cfg_dir, facture_ref)?;
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let entry = state
        .find_mut(&number)
        .ok_or_else(|| FactureError::DocumentNotFound(number.clone()))?;

    if entry.payments.is_empty() {
        return Err(FactureError::NoPayments(number));
    }

    // Determine which payment to remove (1-based index, default to last)
    let remove_idx = match index {
        Some(i) => {
            if i == 0 || i > entry.payments.len() {
                return Err(FactureError::InvalidPaymentIndex {
                    facture: number,
                    index: i,
                    count: entry.payments.len(),
                });
            }
            i - 1
        }
        None => entry.payments.len() - 1,
    };

    let removed = entry.payments.remove(remove_idx);
    let fac_number = entry.number.clone();

    save_state(cfg_dir, &state)?;

    println!(
        "Removed {} payment from {fac_number}",
        format_money(removed.amount, &config.document.currency_label)
    );

    Ok(())
}

/// Show payment history for a facture
fn cmd_payments(cfg_dir: &PathBuf, facture_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = resolve_document_number(cfg_dir, facture_ref)?;
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let entry = state
        .find(&number)
        .ok_or_else(|| FactureError::DocumentNotFound(number.clone()))?;

    if entry.kind != DocumentKind::Facture {
        return Err(FactureError::NotAFacture(number));
    }

    println!("Payments for {number}");

    let label = config.document.currency_label.as_str();
    if entry.payments.is_empty() {
        println!("  No payments recorded.");
    } else {
        let rows: Vec<PaymentRow> = entry
            .payments
            .iter()
            .enumerate()
            .map(|(idx, p)| PaymentRow {
                index: idx + 1,
                date: p.date.to_string(),
                amount: format_money(p.amount, label),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!(
        "Total paid: {} / {} (Status: {})",
        format_money(entry.paid_amount(), label),
        format_money(entry.total, label),
        entry.status()
    );

    Ok(())
}

/// Show a facture summary table for a client
fn cmd_report(
    cfg_dir: &PathBuf,
    client_id: &str,
    from: Option<String>,
    to: Option<String>,
    status: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    // Validate client exists
    let client = clients
        .get(client_id)
        .ok_or_else(|| FactureError::ClientNotFound(client_id.to_string()))?;

    // Parse date filters
    let from_date = from
        .as_ref()
        .map(|s| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| FactureError::InvalidDate(s.clone()))
        })
        .transpose()?;
    let to_date = to
        .as_ref()
        .map(|s| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| FactureError::InvalidDate(s.clone()))
        })
        .transpose()?;

    // Validate status filter
    let status_filter = status
        .as_deref()
        .map(|s| match s {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "partial" => Ok(PaymentStatus::Partial),
            other => Err(FactureError::InvalidStatusFilter(other.to_string())),
        })
        .transpose()?;

    // Filter facture entries for this client
    let filtered: Vec<_> = state
        .history
        .iter()
        .filter(|e| e.kind == DocumentKind::Facture)
        .filter(|e| e.client == client_id)
        .filter(|e| from_date.map_or(true, |d| e.date >= d))
        .filter(|e| to_date.map_or(true, |d| e.date <= d))
        .filter(|e| status_filter.map_or(true, |s| e.status() == s))
        .collect();

    if filtered.is_empty() {
        println!("No factures found for client '{client_id}' with the given filters.");
        return Ok(());
    }

    let label = config.document.currency_label.as_str();
    let rows: Vec<ReportRow> = filtered
        .iter()
        .map(|e| ReportRow {
            number: e.number.clone(),
            date: e.date.to_string(),
            total: format_money(e.total, label),
            paid: format_money(e.paid_amount(), label),
            outstanding: format_money(e.outstanding(), label),
            status: e.status().to_string(),
        })
        .collect();

    let total: Decimal = filtered.iter().map(|e| e.total).sum();
    let paid: Decimal = filtered.iter().map(|e| e.paid_amount()).sum();
    let outstanding = total - paid;

    println!("Report for '{client_id}' ({})", client.name);
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    println!("  Factures:    {}", filtered.len());
    println!("  Total:       {}", format_money(total, label));
    println!("  Paid:        {}", format_money(paid, label));
    println!("  Outstanding: {}", format_money(outstanding, label));

    Ok(())
}
