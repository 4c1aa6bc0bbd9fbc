use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use wet_core::budget::DEFAULT_FIXED_CATEGORIES;

use crate::state::{ensure_dir, wet_home};

pub const DEFAULT_TIMEZONE: &str = "Africa/Nairobi";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub ledger: LedgerSection,
    #[serde(default)]
    pub budget: BudgetSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    /// Where the JSON data files live (default: ~/.wet)
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    /// Starting cash position for net worth
    pub opening_balance: f64,
    pub currency: String,
    /// IANA timezone used for "today"
    pub timezone: String,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            opening_balance: 0.0,
            currency: "KES".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSection {
    /// Categories counted as fixed costs in budget progress
    pub fixed_categories: Vec<String>,
}

impl Default for BudgetSection {
    fn default() -> Self {
        Self {
            fixed_categories: DEFAULT_FIXED_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(wet_home()?.join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        ensure_dir(dir)?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(path, &Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempdir().unwrap();
        let cfg = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(cfg.ledger.timezone, "Africa/Nairobi");
        assert_eq!(cfg.ledger.opening_balance, 0.0);
        assert_eq!(cfg.budget.fixed_categories.len(), 5);
        assert!(cfg.storage.data_dir.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("config.toml");
        fs::write(&p, "[ledger]\nopening_balance = 2500.0\n").unwrap();
        let cfg = load_config(&p).unwrap();
        assert_eq!(cfg.ledger.opening_balance, 2500.0);
        assert_eq!(cfg.ledger.currency, "KES");
        assert_eq!(cfg.budget, BudgetSection::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.storage.data_dir = Some(tmp.path().join("data"));
        cfg.ledger.timezone = "Europe/London".to_string();
        save_config(&p, &cfg).unwrap();
        assert_eq!(load_config(&p).unwrap(), cfg);
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("config.toml");
        fs::write(&p, "[ledger]\ncurrency = \"USD\"\n").unwrap();
        init_config(&p).unwrap();
        assert_eq!(load_config(&p).unwrap().ledger.currency, "USD");
    }

    #[test]
    fn test_bad_toml_errors() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("config.toml");
        fs::write(&p, "[ledger\n").unwrap();
        assert!(load_config(&p).is_err());
    }
}
