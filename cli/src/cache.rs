//! Last-oven-id cache
//!
//! The only state this tool persists: the most recently created oven id per
//! (user address, contract address) pair, stored as opaque strings in a flat
//! JSON file. Entries are never validated beyond numeric parsing; a missing
//! or malformed entry reads as zero.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub struct OvenCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl OvenCache {
    pub fn open_default() -> Result<Self> {
        Self::open(default_cache_path())
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read oven cache: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse oven cache: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    fn key(user: &str, contract: &str) -> String {
        format!("oven:{}:{}:last", user, contract)
    }

    pub fn last_oven_id(&self, user: &str, contract: &str) -> u64 {
        self.entries
            .get(&Self::key(user, contract))
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    pub fn save_last_oven(&mut self, user: &str, contract: &str, id: u64) -> Result<()> {
        self.entries
            .insert(Self::key(user, contract), id.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache dir: {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write oven cache: {}", self.path.display()))
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.local/share/kettle/ovens.json").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let cache = OvenCache::open(dir.path().join("ovens.json")).unwrap();
        assert_eq!(cache.last_oven_id("tz1abc", "KT1xyz"), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ovens.json");

        let mut cache = OvenCache::open(path.clone()).unwrap();
        cache.save_last_oven("tz1abc", "KT1xyz", 3).unwrap();
        cache.save_last_oven("tz1abc", "KT1other", 9).unwrap();

        let reloaded = OvenCache::open(path).unwrap();
        assert_eq!(reloaded.last_oven_id("tz1abc", "KT1xyz"), 3);
        assert_eq!(reloaded.last_oven_id("tz1abc", "KT1other"), 9);
        assert_eq!(reloaded.last_oven_id("tz1def", "KT1xyz"), 0);
    }

    #[test]
    fn test_malformed_entry_reads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ovens.json");
        fs::write(&path, r#"{"oven:tz1abc:KT1xyz:last": "not-a-number"}"#).unwrap();

        let cache = OvenCache::open(path).unwrap();
        assert_eq!(cache.last_oven_id("tz1abc", "KT1xyz"), 0);
    }
}
