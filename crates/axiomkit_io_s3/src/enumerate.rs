//! Member enumeration for local trees and remote prefixes.

use std::io;

use tracing::debug;

use crate::localfs::LocalFilesystem;
use crate::spec::{
    EnumFailureCause, EnumLocation, SpecMember, SpecTransferOptions, TransferTreeError,
};
use crate::store::{ObjectStore, SpecObjectInfo};
use crate::util::absolutize_path;

/// Page through every object under `bucket/prefix`.
///
/// Zero-size objects are dropped when [`SpecTransferOptions::if_skip_empty_objects`]
/// is set; zero-size keys ending in `/` are always dropped. Any failed page
/// aborts the whole listing.
pub fn list_remote_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    spec_options: &SpecTransferOptions,
) -> Result<Vec<SpecObjectInfo>, TransferTreeError> {
    let mut l_objects = Vec::new();
    let mut continuation_token: Option<String> = None;
    let mut n_pages: usize = 0;

    loop {
        let page = store
            .list_objects(
                bucket,
                prefix,
                continuation_token.as_deref(),
                spec_options.page_size_list,
            )
            .map_err(|e| TransferTreeError::List {
                location: EnumLocation::Remote {
                    bucket: bucket.to_string(),
                    key: prefix.to_string(),
                }
                .to_string(),
                cause: EnumFailureCause::Store(e),
            })?;
        n_pages += 1;
        debug!(
            bucket,
            prefix,
            page = n_pages,
            n_keys = page.objects.len(),
            store = store.store_type(),
            "listed page"
        );

        l_objects.extend(
            page.objects
                .into_iter()
                .filter(|spec_info| !is_placeholder(spec_info, spec_options)),
        );

        match (page.if_truncated, page.next_continuation_token) {
            (true, Some(token)) => continuation_token = Some(token),
            _ => break,
        }
    }

    Ok(l_objects)
}

/// Objects addressed by a remote source or remove target.
///
/// A key ending in `/` (or empty) selects the whole prefix. Any other key
/// selects at most that exact object; longer keys sharing it as a prefix are
/// dropped from the same listing call.
pub fn list_remote_source(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    spec_options: &SpecTransferOptions,
) -> Result<Vec<SpecObjectInfo>, TransferTreeError> {
    let l_objects = list_remote_objects(store, bucket, key, spec_options)?;
    if key.is_empty() || key.ends_with('/') {
        return Ok(l_objects);
    }
    Ok(l_objects
        .into_iter()
        .filter(|spec_info| spec_info.key == key)
        .collect())
}

fn is_placeholder(spec_info: &SpecObjectInfo, spec_options: &SpecTransferOptions) -> bool {
    if spec_info.size > 0 {
        return false;
    }
    spec_options.if_skip_empty_objects || spec_info.key.ends_with('/')
}

/// Flat list of members under `source`.
///
/// - remote prefix: every listed key under it;
/// - remote key: that exact key when it exists;
/// - local directory: every file below it, depth-first;
/// - local file: the file itself, existing or not.
pub fn enumerate_members(
    source: &EnumLocation,
    store: &dyn ObjectStore,
    fs_local: &dyn LocalFilesystem,
    spec_options: &SpecTransferOptions,
) -> Result<Vec<SpecMember>, TransferTreeError> {
    match source {
        EnumLocation::Remote { bucket, key } => {
            let l_objects = list_remote_source(store, bucket, key, spec_options)?;
            Ok(l_objects
                .into_iter()
                .map(|spec_info| SpecMember::remote(spec_info.key, spec_info.size))
                .collect())
        }
        EnumLocation::Local { path } => {
            if !fs_local.is_directory(&absolutize_path(path)) {
                return Ok(vec![SpecMember::local(path.to_string_lossy().to_string())]);
            }
            let map_list_error = |cause: io::Error| TransferTreeError::List {
                location: source.to_string(),
                cause: EnumFailureCause::Io(cause),
            };
            let l_files = fs_local.list_tree_files(path).map_err(map_list_error)?;
            let mut l_members = Vec::with_capacity(l_files.len());
            for path_file in l_files {
                let Some(name) = path_file.to_str() else {
                    return Err(map_list_error(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Path is not valid UTF-8: {}", path_file.display()),
                    )));
                };
                l_members.push(SpecMember::local(name));
            }
            Ok(l_members)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{enumerate_members, list_remote_objects, list_remote_source};
    use crate::localfs::StdLocalFilesystem;
    use crate::memory::MemoryObjectStore;
    use crate::spec::{EnumLocation, SpecMember, SpecTransferOptions, TransferTreeError};
    use crate::test_support::FaultyObjectStore;

    fn remote(bucket: &str, key: &str) -> EnumLocation {
        EnumLocation::Remote {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    fn names(l_members: &[SpecMember]) -> Vec<&str> {
        l_members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn remote_prefix_filters_placeholder() {
        let store = MemoryObjectStore::new();
        store.put_object("b", "data/x/", "").expect("put");
        store.put_object("b", "data/x/a.txt", "a").expect("put");
        store.put_object("b", "data/x/sub/b.txt", "b").expect("put");
        store.put_object("b", "data/y/c.txt", "c").expect("put");

        let l_members = enumerate_members(
            &remote("b", "data/x/"),
            &store,
            &StdLocalFilesystem,
            &SpecTransferOptions::default(),
        )
        .expect("enumerate");
        assert_eq!(names(&l_members), vec!["data/x/a.txt", "data/x/sub/b.txt"]);
        assert_eq!(l_members[0].size, Some(1));
    }

    #[test]
    fn remote_listing_follows_continuation_across_pages() {
        let store = FaultyObjectStore::new();
        for n_idx in 0..25 {
            store
                .inner
                .put_object("b", &format!("p/{n_idx:03}.txt"), "x")
                .expect("put");
        }
        let spec_options = SpecTransferOptions {
            page_size_list: 10,
            ..SpecTransferOptions::default()
        };

        let l_objects = list_remote_objects(&store, "b", "p/", &spec_options).expect("list");
        assert_eq!(l_objects.len(), 25);
        assert_eq!(store.count_list_calls(), 3);
        assert_eq!(l_objects[0].key, "p/000.txt");
        assert_eq!(l_objects[24].key, "p/024.txt");
    }

    #[test]
    fn remote_zero_byte_objects_kept_when_requested() {
        let store = MemoryObjectStore::new();
        store.put_object("b", "p/", "").expect("put");
        store.put_object("b", "p/empty.txt", "").expect("put");

        let spec_options = SpecTransferOptions {
            if_skip_empty_objects: false,
            ..SpecTransferOptions::default()
        };
        let l_objects = list_remote_objects(&store, "b", "p/", &spec_options).expect("list");
        let l_keys: Vec<_> = l_objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(l_keys, vec!["p/empty.txt"]);
    }

    #[test]
    fn remote_missing_exact_key_yields_nothing() {
        let store = MemoryObjectStore::new();
        store.put_object("b", "other.txt", "o").expect("put");
        let l_members = enumerate_members(
            &remote("b", "missing.txt"),
            &store,
            &StdLocalFilesystem,
            &SpecTransferOptions::default(),
        )
        .expect("enumerate");
        assert!(l_members.is_empty());
    }

    #[test]
    fn remote_exact_key_ignores_longer_siblings() {
        let store = MemoryObjectStore::new();
        for key in ["data/a.txt", "data/a.txt.bak", "data/a.txt/child"] {
            store.put_object("b", key, "x").expect("put");
        }

        let l_members = enumerate_members(
            &remote("b", "data/a.txt"),
            &store,
            &StdLocalFilesystem,
            &SpecTransferOptions::default(),
        )
        .expect("enumerate");
        assert_eq!(names(&l_members), vec!["data/a.txt"]);

        let l_objects =
            list_remote_source(&store, "b", "data/", &SpecTransferOptions::default())
                .expect("list");
        assert_eq!(l_objects.len(), 3);
    }

    #[test]
    fn remote_listing_failure_aborts() {
        let store = FaultyObjectStore::new();
        store.inner.put_object("b", "p/a.txt", "a").expect("put");
        store.fail_list_on_page(2);
        let spec_options = SpecTransferOptions {
            page_size_list: 1,
            ..SpecTransferOptions::default()
        };
        store.inner.put_object("b", "p/b.txt", "b").expect("put");

        let err = list_remote_objects(&store, "b", "p/", &spec_options).expect_err("must fail");
        assert!(matches!(err, TransferTreeError::List { .. }));
    }

    #[test]
    fn local_directory_lists_files_only() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().join("dir");
        std::fs::create_dir_all(root.join("sub/empty")).expect("mkdir");
        std::fs::write(root.join("a.txt"), "a").expect("write");
        std::fs::write(root.join("sub/b.txt"), "b").expect("write");

        let l_members = enumerate_members(
            &EnumLocation::Local { path: root.clone() },
            &MemoryObjectStore::new(),
            &StdLocalFilesystem,
            &SpecTransferOptions::default(),
        )
        .expect("enumerate");
        let l_paths: Vec<PathBuf> = l_members.iter().map(|m| PathBuf::from(&m.name)).collect();
        assert_eq!(l_paths, vec![root.join("a.txt"), root.join("sub/b.txt")]);
        assert!(l_members.iter().all(|m| m.size.is_none()));
    }

    #[test]
    fn local_single_file_is_one_member() {
        let l_members = enumerate_members(
            &EnumLocation::Local {
                path: Path::new("/no/such/file.txt").to_path_buf(),
            },
            &MemoryObjectStore::new(),
            &StdLocalFilesystem,
            &SpecTransferOptions::default(),
        )
        .expect("enumerate");
        assert_eq!(names(&l_members), vec!["/no/such/file.txt"]);
    }
}
