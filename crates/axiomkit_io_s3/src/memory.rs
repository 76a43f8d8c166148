//! In-process object store.
//!
//! Keeps objects in a sorted map so listings come back in the same
//! lexicographic order a real store returns. Continuation tokens are the last
//! key of the previous page.

use std::collections::BTreeMap;
use std::fs;
use std::ops::Bound;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::store::{
    ObjectStore, ObjectStoreError, SpecDeleteFailure, SpecObjectInfo, SpecObjectPage,
};

#[derive(Debug, Clone)]
struct SpecStoredObject {
    data: Vec<u8>,
    last_modified: DateTime<Utc>,
}

type TypeObjectMap = BTreeMap<String, BTreeMap<String, SpecStoredObject>>;

/// Object store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    buckets: RwLock<TypeObjectMap>,
}

impl MemoryObjectStore {
    /// Empty store with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `bucket/key`, stamped with the current time.
    pub fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), ObjectStoreError> {
        self.put_object_at(bucket, key, data, Utc::now())
    }

    /// Store `data` under `bucket/key` with an explicit modification time.
    pub fn put_object_at(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Vec<u8>>,
        last_modified: DateTime<Utc>,
    ) -> Result<(), ObjectStoreError> {
        self.write()?
            .entry(bucket.to_string())
            .or_default()
            .insert(
                key.to_string(),
                SpecStoredObject {
                    data: data.into(),
                    last_modified,
                },
            );
        Ok(())
    }

    /// Object bytes, if present.
    pub fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        Ok(self
            .read()?
            .get(bucket)
            .and_then(|dict_objects| dict_objects.get(key))
            .map(|spec_object| spec_object.data.clone()))
    }

    /// All keys in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Result<Vec<String>, ObjectStoreError> {
        Ok(self
            .read()?
            .get(bucket)
            .map(|dict_objects| dict_objects.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TypeObjectMap>, ObjectStoreError> {
        self.buckets
            .read()
            .map_err(|_| ObjectStoreError::Provider("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TypeObjectMap>, ObjectStoreError> {
        self.buckets
            .write()
            .map_err(|_| ObjectStoreError::Provider("memory store lock poisoned".to_string()))
    }

    fn fetch(&self, bucket: &str, key: &str) -> Result<SpecStoredObject, ObjectStoreError> {
        self.read()?
            .get(bucket)
            .and_then(|dict_objects| dict_objects.get(key))
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(format!("{bucket}/{key}")))
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> Result<SpecObjectPage, ObjectStoreError> {
        let dict_buckets = self.read()?;
        let Some(dict_objects) = dict_buckets.get(bucket) else {
            return Err(ObjectStoreError::NotFound(format!("bucket {bucket}")));
        };

        let bound_start = match continuation_token {
            Some(token) => {
                if !token.starts_with(prefix) {
                    return Err(ObjectStoreError::InvalidContinuationToken(token.to_string()));
                }
                Bound::Excluded(token.to_string())
            }
            None => Bound::Included(prefix.to_string()),
        };

        let mut iter_matches = dict_objects
            .range((bound_start, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix));

        let mut l_objects = Vec::new();
        for (key, spec_object) in iter_matches.by_ref().take(max_keys) {
            l_objects.push(SpecObjectInfo {
                key: key.clone(),
                size: spec_object.data.len() as u64,
                last_modified: spec_object.last_modified,
            });
        }
        let if_truncated = iter_matches.next().is_some();
        let next_continuation_token = if if_truncated {
            l_objects.last().map(|spec_info| spec_info.key.clone())
        } else {
            None
        };

        Ok(SpecObjectPage {
            objects: l_objects,
            next_continuation_token,
            if_truncated,
        })
    }

    fn copy_object(
        &self,
        bucket_src: &str,
        key_src: &str,
        bucket_dst: &str,
        key_dst: &str,
    ) -> Result<(), ObjectStoreError> {
        let spec_object = self.fetch(bucket_src, key_src)?;
        self.put_object(bucket_dst, key_dst, spec_object.data)
    }

    fn download_object(
        &self,
        bucket: &str,
        key: &str,
        path_local: &Path,
    ) -> Result<(), ObjectStoreError> {
        let spec_object = self.fetch(bucket, key)?;
        fs::write(path_local, spec_object.data)?;
        Ok(())
    }

    fn upload_object(
        &self,
        path_local: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), ObjectStoreError> {
        let raw_data = fs::read(path_local)?;
        self.put_object(bucket, key, raw_data)
    }

    fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<SpecDeleteFailure>, ObjectStoreError> {
        let mut dict_buckets = self.write()?;
        if let Some(dict_objects) = dict_buckets.get_mut(bucket) {
            for key in keys {
                dict_objects.remove(key);
            }
        }
        Ok(Vec::new())
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}
