use std::collections::HashMap;
use std::fs::{self, File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisRecord;
use crate::error::AnalyticsError;
use crate::login::User;
use crate::saving;

/// File-backed JSON document store.
///
/// Layout under the store root:
///
/// ```text
/// data/
///   users.json                        id-keyed user documents
///   uploads/<user_id>/<id>.bin.gz     raw upload bytes, gzipped
///   records/<user_id>/<id>.json       analysis documents
/// ```
///
/// Writes are whole-document, last writer wins. Per-user directories
/// mean there is no cross-user contention on record files.
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    /// Create the store directories and an empty users file if absent.
    ///
    /// Call once at startup before serving requests.
    pub fn init(&self) -> Result<(), AnalyticsError> {
        create_dir_all(self.root.join("uploads"))?;
        create_dir_all(self.root.join("records"))?;

        let users_path = self.users_path();
        if !users_path.exists() {
            let mut file = File::create(&users_path)?;
            file.write_all(b"{}")?;
        }

        Ok(())
    }

    fn users_path(&self) -> PathBuf {
        self.root.join("users.json")
    }

    fn uploads_dir(&self, user_id: &str) -> PathBuf {
        self.root.join("uploads").join(user_id)
    }

    fn records_dir(&self, user_id: &str) -> PathBuf {
        self.root.join("records").join(user_id)
    }

    fn upload_path(&self, user_id: &str, id: &str) -> PathBuf {
        self.uploads_dir(user_id).join(format!("{}.bin.gz", id))
    }

    fn record_path(&self, user_id: &str, id: &str) -> PathBuf {
        self.records_dir(user_id).join(format!("{}.json", id))
    }

    // ----- users -----

    /// Read the full user map from disk.
    pub fn load_users(&self) -> Result<HashMap<String, User>, AnalyticsError> {
        let contents = fs::read_to_string(self.users_path())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the full user map back to disk.
    pub fn save_users(&self, users: &HashMap<String, User>) -> Result<(), AnalyticsError> {
        let json = serde_json::to_string_pretty(users)?;
        fs::write(self.users_path(), json)?;
        Ok(())
    }

    // ----- analysis records -----

    /// Persist a record document, creating the user's directory on
    /// first write.
    pub fn save_record(&self, record: &AnalysisRecord) -> Result<(), AnalyticsError> {
        create_dir_all(self.records_dir(&record.user_id))?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(&record.user_id, &record.id), json)?;
        Ok(())
    }

    /// Load one record owned by `user_id`.
    ///
    /// # Errors
    /// * `AnalyticsError::NotFound` when no such record exists for
    ///   this user (a foreign user's id behaves the same as a missing
    ///   one)
    pub fn load_record(&self, user_id: &str, id: &str) -> Result<AnalysisRecord, AnalyticsError> {
        let path = self.record_path(user_id, id);
        if !path.exists() {
            return Err(AnalyticsError::NotFound(format!("record {}", id)));
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// All records owned by `user_id`, newest first.
    pub fn list_records(&self, user_id: &str) -> Result<Vec<AnalysisRecord>, AnalyticsError> {
        let dir = self.records_dir(user_id);
        let mut records = Vec::new();

        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let contents = fs::read_to_string(&path)?;
                records.push(serde_json::from_str::<AnalysisRecord>(&contents)?);
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Every record in the store, newest first. Admin dashboards only;
    /// this walks all user directories.
    pub fn all_records(&self) -> Result<Vec<AnalysisRecord>, AnalyticsError> {
        let mut records = Vec::new();

        if let Ok(users) = fs::read_dir(self.root.join("records")) {
            for user_entry in users.flatten() {
                if !user_entry.path().is_dir() {
                    continue;
                }
                if let Some(user_id) = user_entry.file_name().to_str() {
                    records.extend(self.list_records(user_id)?);
                }
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Delete a record document together with its stored upload bytes.
    ///
    /// Cascading and final: there is no orphan recovery.
    pub fn delete_record(&self, user_id: &str, id: &str) -> Result<(), AnalyticsError> {
        let record_path = self.record_path(user_id, id);
        if !record_path.exists() {
            return Err(AnalyticsError::NotFound(format!("record {}", id)));
        }
        fs::remove_file(record_path)?;

        let upload_path = self.upload_path(user_id, id);
        if upload_path.exists() {
            fs::remove_file(upload_path)?;
        }

        Ok(())
    }

    // ----- raw upload bytes -----

    /// Store the original upload, gzip-compressed.
    pub fn save_upload(&self, user_id: &str, id: &str, bytes: &[u8]) -> Result<(), AnalyticsError> {
        create_dir_all(self.uploads_dir(user_id))?;
        saving::save_compressed(self.upload_path(user_id, id), bytes)?;
        Ok(())
    }

    /// Read the original upload back, decompressed.
    pub fn load_upload(&self, user_id: &str, id: &str) -> Result<Vec<u8>, AnalyticsError> {
        let path = self.upload_path(user_id, id);
        if !path.exists() {
            return Err(AnalyticsError::NotFound(format!("upload {}", id)));
        }
        Ok(saving::load_compressed(path)?)
    }

    // ----- admin bulk operations -----

    /// Purge everything a user has uploaded. Returns the number of
    /// record documents removed.
    pub fn delete_user_uploads(&self, user_id: &str) -> Result<usize, AnalyticsError> {
        let count = self
            .list_records(user_id)
            .map(|records| records.len())
            .unwrap_or(0);

        remove_dir_if_present(self.records_dir(user_id))?;
        remove_dir_if_present(self.uploads_dir(user_id))?;

        Ok(count)
    }
}

fn remove_dir_if_present(dir: PathBuf) -> std::io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}
