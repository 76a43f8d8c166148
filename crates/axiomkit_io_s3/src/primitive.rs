//! Single-object transfers. Each performs exactly one store call, no retries.

use std::path::Path;

use crate::conf::C_REMOTE_SCHEME;
use crate::spec::{EnumFailureCause, TransferTreeError};
use crate::store::{ObjectStore, ObjectStoreError};

fn map_transfer_error(
    src: String,
    dst: String,
) -> impl FnOnce(ObjectStoreError) -> TransferTreeError {
    move |e| TransferTreeError::Transfer {
        src,
        dst,
        cause: EnumFailureCause::Store(e),
    }
}

fn format_uri(bucket: &str, key: &str) -> String {
    format!("{C_REMOTE_SCHEME}{bucket}/{key}")
}

/// Server-side copy of `bucket_src/key_src` to `bucket_dst/key_dst`.
pub fn copy_remote_to_remote(
    store: &dyn ObjectStore,
    bucket_src: &str,
    key_src: &str,
    bucket_dst: &str,
    key_dst: &str,
) -> Result<(), TransferTreeError> {
    store
        .copy_object(bucket_src, key_src, bucket_dst, key_dst)
        .map_err(map_transfer_error(
            format_uri(bucket_src, key_src),
            format_uri(bucket_dst, key_dst),
        ))
}

/// Download `bucket_src/key_src` to `path_dst`; the parent must already exist.
pub fn copy_remote_to_local(
    store: &dyn ObjectStore,
    bucket_src: &str,
    key_src: &str,
    path_dst: &Path,
) -> Result<(), TransferTreeError> {
    store
        .download_object(bucket_src, key_src, path_dst)
        .map_err(map_transfer_error(
            format_uri(bucket_src, key_src),
            path_dst.display().to_string(),
        ))
}

/// Upload `path_src` to `bucket_dst/key_dst`.
pub fn copy_local_to_remote(
    store: &dyn ObjectStore,
    path_src: &Path,
    bucket_dst: &str,
    key_dst: &str,
) -> Result<(), TransferTreeError> {
    store
        .upload_object(path_src, bucket_dst, key_dst)
        .map_err(map_transfer_error(
            path_src.display().to_string(),
            format_uri(bucket_dst, key_dst),
        ))
}

#[cfg(test)]
mod tests {
    use super::{copy_local_to_remote, copy_remote_to_local, copy_remote_to_remote};
    use crate::memory::MemoryObjectStore;
    use crate::spec::{EnumFailureCause, TransferTreeError};
    use crate::store::ObjectStoreError;

    #[test]
    fn remote_to_remote_copies_by_reference() {
        let store = MemoryObjectStore::new();
        store.put_object("src", "k", "data").expect("put");
        copy_remote_to_remote(&store, "src", "k", "dst", "out/k").expect("copy");
        assert_eq!(
            store.get_object("dst", "out/k").expect("get"),
            Some(b"data".to_vec())
        );
        assert!(store.get_object("src", "k").expect("get").is_some());
    }

    #[test]
    fn missing_source_wraps_store_error() {
        let store = MemoryObjectStore::new();
        let err = copy_remote_to_remote(&store, "src", "missing", "dst", "k")
            .expect_err("missing source must fail");
        match err {
            TransferTreeError::Transfer { src, dst, cause } => {
                assert_eq!(src, "s3://src/missing");
                assert_eq!(dst, "s3://dst/k");
                assert!(matches!(
                    cause,
                    EnumFailureCause::Store(ObjectStoreError::NotFound(_))
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn download_and_upload_use_exact_paths() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = MemoryObjectStore::new();
        store.put_object("b", "k", "bytes").expect("put");

        let path_dst = tmp.path().join("k.bin");
        copy_remote_to_local(&store, "b", "k", &path_dst).expect("download");
        assert_eq!(std::fs::read(&path_dst).expect("read"), b"bytes");

        copy_local_to_remote(&store, &path_dst, "b", "again").expect("upload");
        assert_eq!(
            store.get_object("b", "again").expect("get"),
            Some(b"bytes".to_vec())
        );
    }

    #[test]
    fn download_into_missing_parent_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = MemoryObjectStore::new();
        store.put_object("b", "k", "bytes").expect("put");

        let err = copy_remote_to_local(&store, "b", "k", &tmp.path().join("no/such/k"))
            .expect_err("missing parent must fail");
        assert!(matches!(err, TransferTreeError::Transfer { .. }));
    }
}
