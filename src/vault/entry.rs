//! Entry and Vault types.
//!
//! The same JSON shape travels through the handoff state file and,
//! encrypted, through the on-disk vault:
//!
//! ```text
//! { "entries": [ { "id", "name", "username", "password", "url"?, "notes"?,
//!                  "tags": [...], "created_at" } ], "salt": "..." }
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::errors::{PasslockError, Result};

/// One stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque identifier, stable for the entry's lifetime.
    pub id: String,

    pub name: String,

    pub username: String,

    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Unordered labels; a set keeps the serialized order deterministic.
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Fixed at creation, never mutated.
    pub created_at: DateTime<Utc>,
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl Entry {
    /// Returns `true` if the entry carries `tag` exactly.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Case-insensitive substring match on name, username, or url.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.username.to_lowercase().contains(needle_lower)
            || self
                .url
                .as_deref()
                .is_some_and(|u| u.to_lowercase().contains(needle_lower))
    }
}

/// Caller-supplied fields for a new entry, before an id is assigned.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub name: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl Drop for NewEntry {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl NewEntry {
    pub fn new(name: &str, username: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            url: None,
            notes: None,
            tags: Vec::new(),
        }
    }

    /// Builder-style url setter.
    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Builder-style notes setter.
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Builder-style tag appender.
    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Reject empty required fields.
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.is_empty() {
                return Err(PasslockError::InvalidInput(format!(
                    "{field} cannot be empty"
                )));
            }
        }
        Ok(())
    }
}

/// The session's working set of entries plus the engine's salt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Insertion-ordered entries.
    #[serde(default)]
    pub entries: Vec<Entry>,

    /// Copied verbatim from the on-disk vault; only the engine may change it.
    pub salt: String,
}

impl Vault {
    /// An empty vault bound to `salt`.
    pub fn new(salt: String) -> Self {
        Self {
            entries: Vec::new(),
            salt,
        }
    }

    /// Validate `fields`, assign a fresh id and timestamp, and append.
    ///
    /// Returns a clone of the stored entry.
    pub fn insert(&mut self, fields: &NewEntry) -> Result<Entry> {
        fields.validate()?;

        let entry = Entry {
            id: self.fresh_id(),
            name: fields.name.clone(),
            username: fields.username.clone(),
            password: fields.password.clone(),
            url: non_empty(fields.url.as_deref()),
            notes: non_empty(fields.notes.as_deref()),
            tags: fields
                .tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            created_at: Utc::now(),
        };

        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Remove the entry with `id`, preserving the order of the rest.
    pub fn remove(&mut self, id: &str) -> Result<Entry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PasslockError::NotFound(id.to_string()))?;
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries carrying `tag`; an empty tag means no filter.
    pub fn filter_by_tag(&self, tag: &str) -> Vec<Entry> {
        let tag = tag.trim();
        if tag.is_empty() {
            return self.entries.clone();
        }
        self.entries
            .iter()
            .filter(|e| e.has_tag(tag))
            .cloned()
            .collect()
    }

    /// Entries whose name, username, or url contain `query` (any case).
    pub fn search(&self, query: &str) -> Vec<Entry> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.matches(&needle))
            .cloned()
            .collect()
    }

    /// 128 random bits as hex, re-drawn until no live entry uses it.
    fn fresh_id(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let id = format!("{:032x}", rng.random::<u128>());
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
