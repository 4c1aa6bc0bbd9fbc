use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn wet_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".wet"))
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))
}

/// Data directory: `--data-dir`, else `[storage] data_dir`, else `~/.wet`.
pub fn resolve_data_dir(flag: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    let dir = match flag.or(configured) {
        Some(d) => d.to_path_buf(),
        None => wet_home()?,
    };
    ensure_dir(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flag_beats_config() {
        let tmp = tempdir().unwrap();
        let flag = tmp.path().join("flag");
        let cfg = tmp.path().join("cfg");
        let got = resolve_data_dir(Some(&flag), Some(&cfg)).unwrap();
        assert_eq!(got, flag);
        assert!(flag.is_dir());
        assert!(!cfg.exists());
    }

    #[test]
    fn test_configured_dir_is_created() {
        let tmp = tempdir().unwrap();
        let cfg = tmp.path().join("a").join("b");
        assert_eq!(resolve_data_dir(None, Some(&cfg)).unwrap(), cfg);
        assert!(cfg.is_dir());
    }
}
