//! Failure-injecting store wrapper shared by unit tests.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::memory::MemoryObjectStore;
use crate::store::{ObjectStore, ObjectStoreError, SpecDeleteFailure, SpecObjectPage};

#[derive(Debug, Default)]
pub(crate) struct FaultyObjectStore {
    pub(crate) inner: MemoryObjectStore,
    n_list_calls: AtomicUsize,
    n_list_fail_page: Mutex<Option<usize>>,
    set_fail_keys: Mutex<HashSet<String>>,
    if_fail_delete: Mutex<bool>,
    set_reject_delete_keys: Mutex<HashSet<String>>,
    l_extra_rejections: Mutex<Vec<String>>,
    if_drop_source_after_copy: Mutex<bool>,
    l_delete_calls: Mutex<Vec<Vec<String>>>,
    l_transfer_calls: Mutex<Vec<String>>,
}

impl FaultyObjectStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the `n_page`-th listing request (1-based, counted across calls).
    pub(crate) fn fail_list_on_page(&self, n_page: usize) {
        *self.n_list_fail_page.lock().expect("lock") = Some(n_page);
    }

    /// Fail copy/download/upload whenever source or destination key is `key`.
    pub(crate) fn fail_transfer_for_key(&self, key: &str) {
        self.set_fail_keys.lock().expect("lock").insert(key.to_string());
    }

    pub(crate) fn fail_delete(&self) {
        *self.if_fail_delete.lock().expect("lock") = true;
    }

    pub(crate) fn reject_delete_key(&self, key: &str) {
        self.set_reject_delete_keys
            .lock()
            .expect("lock")
            .insert(key.to_string());
    }

    /// Report `key` as rejected by every delete request, even if never sent.
    pub(crate) fn report_extra_rejection(&self, key: &str) {
        self.l_extra_rejections
            .lock()
            .expect("lock")
            .push(key.to_string());
    }

    /// Remove the source object right after each successful server-side copy.
    pub(crate) fn drop_source_after_copy(&self) {
        *self.if_drop_source_after_copy.lock().expect("lock") = true;
    }

    pub(crate) fn count_list_calls(&self) -> usize {
        self.n_list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> Vec<Vec<String>> {
        self.l_delete_calls.lock().expect("lock").clone()
    }

    /// Destination keys/paths of attempted transfers, in call order.
    pub(crate) fn transfer_calls(&self) -> Vec<String> {
        self.l_transfer_calls.lock().expect("lock").clone()
    }

    fn check_transfer(&self, key_src: &str, key_dst: &str) -> Result<(), ObjectStoreError> {
        self.l_transfer_calls
            .lock()
            .expect("lock")
            .push(key_dst.to_string());
        let set_fail_keys = self.set_fail_keys.lock().expect("lock");
        if set_fail_keys.contains(key_src) || set_fail_keys.contains(key_dst) {
            return Err(ObjectStoreError::Network(format!(
                "injected failure for {key_src} -> {key_dst}"
            )));
        }
        Ok(())
    }
}

impl ObjectStore for FaultyObjectStore {
    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> Result<SpecObjectPage, ObjectStoreError> {
        let n_call = self.n_list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.n_list_fail_page.lock().expect("lock") == Some(n_call) {
            return Err(ObjectStoreError::Network("injected list failure".to_string()));
        }
        self.inner.list_objects(bucket, prefix, continuation_token, max_keys)
    }

    fn copy_object(
        &self,
        bucket_src: &str,
        key_src: &str,
        bucket_dst: &str,
        key_dst: &str,
    ) -> Result<(), ObjectStoreError> {
        self.check_transfer(key_src, key_dst)?;
        self.inner.copy_object(bucket_src, key_src, bucket_dst, key_dst)?;
        if *self.if_drop_source_after_copy.lock().expect("lock") {
            self.inner.delete_objects(bucket_src, &[key_src.to_string()])?;
        }
        Ok(())
    }

    fn download_object(
        &self,
        bucket: &str,
        key: &str,
        path_local: &Path,
    ) -> Result<(), ObjectStoreError> {
        self.check_transfer(key, &path_local.to_string_lossy())?;
        self.inner.download_object(bucket, key, path_local)
    }

    fn upload_object(
        &self,
        path_local: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), ObjectStoreError> {
        self.check_transfer(&path_local.to_string_lossy(), key)?;
        self.inner.upload_object(path_local, bucket, key)
    }

    fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<SpecDeleteFailure>, ObjectStoreError> {
        self.l_delete_calls.lock().expect("lock").push(keys.to_vec());
        if *self.if_fail_delete.lock().expect("lock") {
            return Err(ObjectStoreError::PermissionDenied(
                "injected delete failure".to_string(),
            ));
        }
        let set_reject = self.set_reject_delete_keys.lock().expect("lock").clone();
        let (l_rejected, l_accepted): (Vec<String>, Vec<String>) =
            keys.iter().cloned().partition(|key| set_reject.contains(key));
        self.inner.delete_objects(bucket, &l_accepted)?;
        let l_extra = self.l_extra_rejections.lock().expect("lock").clone();
        Ok(l_rejected
            .into_iter()
            .chain(l_extra)
            .map(|key| SpecDeleteFailure {
                key,
                message: "AccessDenied".to_string(),
            })
            .collect())
    }

    fn store_type(&self) -> &'static str {
        "faulty-memory"
    }
}
