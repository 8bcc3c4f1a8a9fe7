use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use report_engine::PreferenceStore;
use report_logging::{report_info, report_warn};
use tempfile::NamedTempFile;

/// Workstation preferences kept in a RON map on disk.
pub struct FilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Opens the store; an unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path);
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        match self.values.lock() {
            Ok(values) => values,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> io::Result<()> {
        let content = ron::ser::to_string_pretty(values, ron::ser::PrettyConfig::new())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        report_info!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.values();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut values = self.values();
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save(&values)
    }
}

fn load_values(path: &Path) -> BTreeMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            report_warn!("Failed to read preferences from {:?}: {}", path, err);
            return BTreeMap::new();
        }
    };
    match ron::from_str(&content) {
        Ok(values) => values,
        Err(err) => {
            report_warn!("Failed to parse preferences from {:?}: {}", path, err);
            BTreeMap::new()
        }
    }
}
