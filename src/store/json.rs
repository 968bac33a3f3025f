use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{FlagStore, StoreError};
use crate::app_dirs::AppDirs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct FlagRecord {
    value: bool,
    updated_at: DateTime<Local>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FlagFile {
    #[serde(default)]
    flags: BTreeMap<String, FlagRecord>,
}

/// Flags kept in a small JSON document. The file is re-read on every access
/// so writes from other processes are never clobbered by a stale copy.
#[derive(Debug, Clone)]
pub struct JsonFlagStore {
    path: PathBuf,
}

impl JsonFlagStore {
    pub fn new() -> Self {
        let path = AppDirs::flags_json_path()
            .unwrap_or_else(|| PathBuf::from("bannerpop_flags.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<FlagFile, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FlagFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, file: &FlagFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(file)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl Default for JsonFlagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagStore for JsonFlagStore {
    fn get(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.read()?.flags.get(key).map(|r| r.value))
    }

    fn set(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        let mut file = self.read()?;
        file.flags.insert(
            key.to_string(),
            FlagRecord {
                value,
                updated_at: Local::now(),
            },
        );
        self.write(&file)
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        let mut file = self.read()?;
        if file.flags.remove(key).is_some() {
            self.write(&file)?;
        }
        Ok(())
    }
}
