mod client;
mod company;
mod item;
pub mod state;

pub use client::Client;
pub use company::{Company, Config, DocumentSettings, PdfSettings};
pub use item::Item;
pub use state::{HistoryEntry, State};

use crate::error::{FactureError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Machine-level config pointing at a shared config directory. Lives
/// outside the config directory itself so it can redirect to it.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub config_dir: Option<String>,
}

/// Path of the global config file (~/.config/facture/global.toml or
/// platform equivalent).
pub fn global_config_file() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "facture") {
        return proj_dirs.config_dir().join("global.toml");
    }
    dirs_home()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".facture")
        .join("global.toml")
}

/// Load the global config, falling back to defaults if absent or invalid.
pub fn load_global_config() -> GlobalConfig {
    let path = global_config_file();
    let Ok(content) = fs::read_to_string(&path) else {
        return GlobalConfig::default();
    };
    toml::from_str(&content).unwrap_or_default()
}

/// Get the config directory path (~/.facture/ unless overridden)
pub fn config_dir() -> Result<PathBuf> {
    // A global config override wins over everything
    let global = load_global_config();
    if let Some(dir) = global.config_dir {
        return Ok(expand_path(&dir));
    }

    // Then XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "facture") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.facture/
    let home = dirs_home().ok_or_else(|| {
        FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".facture"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs_home() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Resolve the PDF output directory relative to the config directory
pub fn resolve_output_dir(output_dir: &str, config_dir: &PathBuf) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(FactureError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::ConfigParse { path, source: e })
}

/// Load clients.toml as a HashMap
pub fn load_clients(config_dir: &PathBuf) -> Result<HashMap<String, Client>> {
    let path = config_dir.join("clients.toml");
    if !path.exists() {
        return Err(FactureError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::ConfigParse { path, source: e })
}

/// Load items.toml as a HashMap
pub fn load_items(config_dir: &PathBuf) -> Result<HashMap<String, Item>> {
    let path = config_dir.join("items.toml");
    if !path.exists() {
        return Err(FactureError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::ConfigParse { path, source: e })
}

/// Load state.toml (creates default if missing)
pub fn load_state(config_dir: &PathBuf) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::ConfigParse { path, source: e })
}

/// Save state.toml
pub fn save_state(config_dir: &PathBuf, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| {
        FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Votre Société SARL"
address = "Rue de la Réunification"
city = "Douala"
country = "Cameroun"
email = "facturation@societe.cm"
# phone = "+237 6 99 00 00 00"   # optional
# tax_id = "M012345678901A"      # optional NIU, printed on documents

[document]
devis_number_format = "DEV-{year}-{seq:04}"    # e.g., DEV-2026-0001
facture_number_format = "FAC-{year}-{seq:04}"  # e.g., FAC-2026-0001
currency = "XAF"
currency_label = "FCFA"
due_days = 30    # payment terms for factures, validity for devis

[pdf]
output_dir = "~/.facture/output"
"#;

/// Template content for clients.toml
pub const CLIENTS_TEMPLATE: &str = r#"# Define your clients here. The table name (e.g., [acme]) is used
# as the client identifier in the devis/facture commands.
#
# Example:
#   facture facture --client acme --item conseil:8

[exemple-client]
name = "Client Exemple SA"
contact = "Aminatou Bello"       # optional
email = "aminatou@exemple.cm"
address = "Avenue Kennedy"
city = "Yaoundé"
# country = "Cameroun"           # optional, defaults to company country
"#;

/// Template content for items.toml
pub const ITEMS_TEMPLATE: &str = r#"# Define your catalog items here. The table name (e.g., [conseil]) is
# used as the item identifier. Prices are in FCFA, tax_rate is the TVA
# percentage. A per-line discount percentage can be appended on the
# command line:
#
#   facture facture --client acme --item conseil:8 --item developpement:40:10

[conseil]
description = "Prestation de conseil"
unit_price = 25000
tax_rate = 19.25
unit = "heure"

[developpement]
description = "Développement logiciel"
unit_price = 20000
tax_rate = 19.25
unit = "heure"

[forfait-installation]
description = "Installation et configuration"
unit_price = 150000
tax_rate = 19.25
unit = "forfait"   # fixed price, quantity is typically 1
"#;
