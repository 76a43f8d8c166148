//! Bulk delete of remote keys and prefixes.

use tracing::{info, warn};

use crate::enumerate::list_remote_source;
use crate::spec::{EnumFailureCause, EnumLocation, SpecTransferOptions, TransferTreeError};
use crate::store::{ObjectStore, ObjectStoreError, SpecDeleteFailure};

/// Delete `keys` in requests of at most `batch_size_delete` keys.
///
/// Every chunk is attempted. Request-level failures and per-key rejections
/// are aggregated; the first request failure wins over rejections when both
/// occur. Returns the number of keys the store accepted.
pub fn delete_keys_chunked(
    store: &dyn ObjectStore,
    bucket: &str,
    keys: &[String],
    batch_size_delete: usize,
    target: &str,
) -> Result<usize, TransferTreeError> {
    if keys.is_empty() {
        return Ok(0);
    }

    let mut n_deleted: usize = 0;
    let mut err_request: Option<ObjectStoreError> = None;
    let mut l_failures: Vec<SpecDeleteFailure> = Vec::new();

    for l_chunk in keys.chunks(batch_size_delete.max(1)) {
        match store.delete_objects(bucket, l_chunk) {
            Ok(l_rejected) => {
                n_deleted += l_chunk.len().saturating_sub(l_rejected.len());
                l_failures.extend(l_rejected);
            }
            Err(e) => {
                warn!(bucket, n_keys = l_chunk.len(), error = %e, "bulk delete request failed");
                if err_request.is_none() {
                    err_request = Some(e);
                }
            }
        }
    }

    if let Some(e) = err_request {
        return Err(TransferTreeError::Delete {
            target: target.to_string(),
            cause: EnumFailureCause::Store(e),
        });
    }
    if !l_failures.is_empty() {
        return Err(TransferTreeError::Delete {
            target: target.to_string(),
            cause: EnumFailureCause::Rejected(l_failures),
        });
    }
    Ok(n_deleted)
}

/// Delete every object under a remote prefix, or one exact remote key.
///
/// `keep` filters listed keys (include/exclude patterns); an empty selection
/// is a successful no-op. Returns `(listed, deleted)`.
pub fn remove_remote<F>(
    store: &dyn ObjectStore,
    target: &EnumLocation,
    spec_options: &SpecTransferOptions,
    keep: F,
) -> Result<(usize, usize), TransferTreeError>
where
    F: Fn(&str) -> bool,
{
    let EnumLocation::Remote { bucket, key } = target else {
        return Err(TransferTreeError::InvalidUri {
            uri: target.to_string(),
        });
    };

    let l_objects = list_remote_source(store, bucket, key, spec_options)?;
    let n_listed = l_objects.len();
    let l_keys: Vec<String> = l_objects
        .into_iter()
        .map(|spec_info| spec_info.key)
        .filter(|key_obj| keep(key_obj))
        .collect();
    if l_keys.is_empty() {
        info!(target = %target, "nothing to delete");
        return Ok((n_listed, 0));
    }
    if spec_options.if_dry_run {
        for key_obj in &l_keys {
            info!(bucket = bucket.as_str(), key = key_obj.as_str(), "(dry run) delete");
        }
        return Ok((n_listed, 0));
    }

    let n_deleted = delete_keys_chunked(
        store,
        bucket,
        &l_keys,
        spec_options.batch_size_delete,
        &target.to_string(),
    )?;
    info!(target = %target, n_deleted, "deleted objects");
    Ok((n_listed, n_deleted))
}
