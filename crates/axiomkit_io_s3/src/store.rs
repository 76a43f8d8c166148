//! Object store capability.
//!
//! The engine never talks to the network directly. Callers construct a store
//! with its own credentials/region/retry policy and pass it in.

use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::conf::C_LIST_TIMESTAMP_FORMAT;

/// Errors surfaced by object store implementations.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// Local side of a download/upload failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Object or bucket does not exist.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Caller lacks permission for the request.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transport failure talking to the store.
    #[error("Network error: {0}")]
    Network(String),

    /// Listing cursor was not recognized.
    #[error("Invalid continuation token: {0}")]
    InvalidContinuationToken(String),

    /// Any other provider-reported failure.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// One listed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecObjectInfo {
    /// Full object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time reported by the store.
    pub last_modified: DateTime<Utc>,
}

impl SpecObjectInfo {
    /// `"<size> <YYYYmmdd HH:MM:SS> <key>"` line used by extended listings.
    pub fn format_extended(&self) -> String {
        format!(
            "{} {} {}",
            self.size,
            self.last_modified.format(C_LIST_TIMESTAMP_FORMAT),
            self.key
        )
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecObjectPage {
    /// Objects in store order.
    pub objects: Vec<SpecObjectInfo>,
    /// Cursor for the next page when truncated.
    pub next_continuation_token: Option<String>,
    /// Whether more pages follow.
    pub if_truncated: bool,
}

/// Per-key failure reported by a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDeleteFailure {
    /// Key that was not deleted.
    pub key: String,
    /// Store-provided reason.
    pub message: String,
}

/// Minimal object store surface required by the transfer engine.
///
/// Implementations own retries and timeouts; every method is called at most
/// once per engine step.
pub trait ObjectStore: Send + Sync {
    /// List up to `max_keys` objects under `prefix`, in lexicographic key order.
    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> Result<SpecObjectPage, ObjectStoreError>;

    /// Server-side copy; the source is read by reference.
    fn copy_object(
        &self,
        bucket_src: &str,
        key_src: &str,
        bucket_dst: &str,
        key_dst: &str,
    ) -> Result<(), ObjectStoreError>;

    /// Download one object to an exact local path whose parent exists.
    fn download_object(
        &self,
        bucket: &str,
        key: &str,
        path_local: &Path,
    ) -> Result<(), ObjectStoreError>;

    /// Upload one local file to an exact key.
    fn upload_object(
        &self,
        path_local: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), ObjectStoreError>;

    /// Delete a batch of keys in one request.
    ///
    /// Missing keys count as deleted. Keys the store refused are returned.
    fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<SpecDeleteFailure>, ObjectStoreError>;

    /// Short backend name for logging.
    fn store_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::SpecObjectInfo;

    #[test]
    fn format_extended_matches_listing_layout() {
        let spec_info = SpecObjectInfo {
            key: "data/x/a.txt".to_string(),
            size: 42,
            last_modified: Utc
                .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
                .single()
                .expect("valid timestamp"),
        };
        assert_eq!(
            spec_info.format_extended(),
            "42 20240309 07:05:01 data/x/a.txt"
        );
    }
}
