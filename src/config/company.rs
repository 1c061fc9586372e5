use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    pub document: DocumentSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// NIU (numéro d'identifiant unique) printed on documents when set.
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentSettings {
    pub devis_number_format: String,
    pub facture_number_format: String,
    /// ISO code; the EUR parity line in `list` only applies to "XAF".
    pub currency: String,
    /// Suffix on every displayed amount ("FCFA" by default).
    pub currency_label: String,
    pub due_days: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}
