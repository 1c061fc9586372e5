use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::DocumentKind;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    #[serde(default)]
    pub devis_counter: Counter,
    #[serde(default)]
    pub facture_counter: Counter,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl State {
    pub fn counter(&self, kind: DocumentKind) -> &Counter {
        match kind {
            DocumentKind::Devis => &self.devis_counter,
            DocumentKind::Facture => &self.facture_counter,
        }
    }

    pub fn counter_mut(&mut self, kind: DocumentKind) -> &mut Counter {
        match kind {
            DocumentKind::Devis => &mut self.devis_counter,
            DocumentKind::Facture => &mut self.facture_counter,
        }
    }

    /// Next sequence number for a kind; counters reset each new year.
    pub fn next_seq(&self, kind: DocumentKind, year: u32) -> u32 {
        let counter = self.counter(kind);
        if counter.last_year == year {
            counter.last_number + 1
        } else {
            1
        }
    }

    pub fn find(&self, number: &str) -> Option<&HistoryEntry> {
        self.history.iter().find(|e| e.number == number)
    }

    pub fn find_mut(&mut self, number: &str) -> Option<&mut HistoryEntry> {
        self.history.iter_mut().find(|e| e.number == number)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Counter {
    pub last_number: u32,
    pub last_year: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            last_number: 0,
            last_year: chrono::Utc::now().year() as u32,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Partial => "PARTIAL",
            PaymentStatus::Paid => "PAID",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Payment {
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryEntry {
    pub number: String,
    /// Entries written before devis support are factures.
    #[serde(default = "default_kind")]
    pub kind: DocumentKind,
    pub client: String,
    pub date: NaiveDate,
    pub total: Decimal,
    pub file: String,
    /// Original item inputs (e.g., ["conseil:8", "developpement:40:10"])
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

fn default_kind() -> DocumentKind {
    DocumentKind::Facture
}

impl HistoryEntry {
    pub fn paid_amount(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn outstanding(&self) -> Decimal {
        self.total - self.paid_amount()
    }

    pub fn status(&self) -> PaymentStatus {
        let paid = self.paid_amount();
        if paid <= Decimal::ZERO {
            PaymentStatus::Unpaid
        } else if paid >= self.total {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        }
    }
}
