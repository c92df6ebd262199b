use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::api::Session;
use crate::utils::app_paths::AppPaths;

/// Fixed storage key the session lives under
pub const SESSION_KEY: &str = "safelink_user";

/// A small persistent key-value store backed by one JSON file.
///
/// Values are strings, and every write replaces the whole file, so a
/// stored value is always read or written as a unit.
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage_file: PathBuf,
}

impl SessionStore {
    /// Store in the default data directory
    pub fn new() -> Result<Self> {
        Ok(Self::with_file(AppPaths::storage_file()?))
    }

    pub fn with_file(storage_file: impl Into<PathBuf>) -> Self {
        Self {
            storage_file: storage_file.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_file
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    /// Restore the saved session. Unreadable or malformed data yields
    /// `None` and is removed; it never fails the caller.
    pub fn load_session(&self) -> Option<Session> {
        let raw = match self.get_item(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(target: "session", "Failed to read session storage: {}", e);
                return None;
            }
        };

        match parse_session(&raw) {
            Some(session) => {
                debug!(target: "session", "Restored session for {}", session.email);
                Some(session)
            }
            None => {
                warn!(target: "session", "Discarding corrupt saved session");
                if let Err(e) = self.remove_item(SESSION_KEY) {
                    warn!(target: "session", "Failed to remove corrupt session: {}", e);
                }
                None
            }
        }
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.set_item(SESSION_KEY, &raw)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.remove_item(SESSION_KEY)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.storage_file.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.storage_file)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(items) => Ok(items),
            Err(e) => {
                // A damaged file is treated like cleared storage
                warn!(target: "session", "Storage file {:?} is not valid JSON: {}", self.storage_file, e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.storage_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(items)?;
        let tmp = self.storage_file.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.storage_file)?;
        Ok(())
    }
}

/// A saved session must be a JSON object that has an `email` field
fn parse_session(raw: &str) -> Option<Session> {
    let value: Value = serde_json::from_str(raw).ok()?;
    if !value.as_object()?.contains_key("email") {
        return None;
    }
    serde_json::from_value(value).ok()
}
