mod generator;

pub use generator::{
    convert_devis, generate_document, get_document_path, regenerate_document, DocumentData,
    DocumentLine,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two document kinds, each with its own numbering counter.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Devis,
    Facture,
}

impl DocumentKind {
    /// Title printed on the PDF.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Devis => "DEVIS",
            DocumentKind::Facture => "FACTURE",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentKind::Devis => "devis",
            DocumentKind::Facture => "facture",
        };
        write!(f, "{s}")
    }
}
