use std::path::PathBuf;
use std::process::Command;

use crate::document::DocumentData;
use crate::error::{FactureError, Result};

/// Embedded Typst template shared by devis and factures.
/// All amounts and rates arrive pre-formatted from Rust; the template
/// only places strings. The JSON path placeholder is replaced at
/// generation time.
const DOCUMENT_TEMPLATE: &str = r##"// Devis / facture template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 2.5cm, bottom: 2.5cm, left: 2.5cm, right: 2.5cm),
)

#set text(font: "Helvetica", size: 10pt, lang: "fr")

// Header with company info and document details
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [
    #text(size: 18pt, weight: "bold")[#data.company.name]
    #v(0.3em)
    #data.company.address \
    #data.company.city, #data.company.country \
    #data.company.email
    #if data.company.phone != none [
      \ #data.company.phone
    ]
  ],
  [
    #text(size: 24pt, weight: "bold")[#data.kind_label]
    #v(0.5em)
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*N° :*], [#data.number],
      [*Date :*], [#data.date],
      [*#data.due_label :*], [#data.due_date],
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

// Client block
#grid(
  columns: (1fr, 1fr),
  [
    #text(weight: "bold", size: 11pt)[Adressé à :]
    #v(0.3em)
    #text(weight: "bold")[#data.client.name]
    #if data.client.contact != none [
      \ #data.client.contact
    ]
    \ #data.client.address
    \ #data.client.city
    #if data.client.country != none [
      , #data.client.country
    ]
    \ #data.client.email
  ],
  []
)

#v(1.5em)

// Line items table
#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto),
  align: (center, left, right, right, center, center, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  // Header
  [*\#*], [*Description*], [*Qté*], [*PU*], [*Remise*], [*TVA*], [*Total TTC*],

  // Lines
  ..data.lines.enumerate().map(((i, line)) => (
    str(i + 1),
    line.description,
    [#line.quantity #line.unit],
    line.unit_price,
    line.discount_rate,
    line.tax_rate,
    line.total,
  )).flatten()
)

#v(1em)

// Totals
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,

    [Sous-total HT :], [#data.subtotal],

    ..if data.has_discount {
      ([Remise :], [− #data.discount])
    } else {
      ()
    },

    ..if data.has_tax {
      ([TVA :], [#data.tax])
    } else {
      ()
    },

    table.hline(stroke: 1pt),
    [*Total TTC :*], [*#data.total*],
  )
]

#v(2em)

#if data.payment_terms != none [
  #text(weight: "bold")[Conditions de paiement :] #data.payment_terms
]

#if data.company.tax_id != none [
  #v(0.5em)
  #text(size: 9pt, fill: gray)[NIU : #data.company.tax_id]
]
"##;

/// Generate PDF using Typst CLI
pub fn generate_pdf(data: &DocumentData, output_path: &PathBuf) -> Result<()> {
    // Check if typst is available
    let typst_check = Command::new("typst").arg("--version").output();

    if typst_check.is_err() {
        return Err(FactureError::TypstNotFound);
    }

    // Create temp directory for template
    let temp_dir = std::env::temp_dir().join("facture-cli");
    std::fs::create_dir_all(&temp_dir)?;

    // Serialize document data to JSON
    let json_data =
        serde_json::to_string(data).map_err(|e| FactureError::PdfGeneration(e.to_string()))?;

    // Write JSON to temp file
    let json_path = temp_dir.join("data.json");
    std::fs::write(&json_path, &json_data)?;

    // Write template with relative JSON path (data.json is in same directory)
    let template_content = DOCUMENT_TEMPLATE.replace("DATA_JSON_PATH", "data.json");
    let template_path = temp_dir.join("document.typ");
    std::fs::write(&template_path, &template_content)?;

    // Run typst compile with root set to temp directory
    let output = Command::new("typst")
        .args([
            "compile",
            "--root",
            temp_dir.to_str().unwrap_or("."),
            template_path.to_str().unwrap_or(""),
            output_path.to_str().unwrap_or(""),
        ])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FactureError::PdfGeneration(stderr.to_string()));
    }

    // Clean up temp files
    let _ = std::fs::remove_file(&template_path);
    let _ = std::fs::remove_file(&json_path);

    Ok(())
}
