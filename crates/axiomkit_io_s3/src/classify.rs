//! Path classification: local vs remote, file vs directory/prefix.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::conf::C_REMOTE_SCHEME;
use crate::localfs::LocalFilesystem;
use crate::spec::{EnumLocation, TransferTreeError};
use crate::util::absolutize_path;

static RE_REMOTE_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{}([a-z0-9.-]+)/(.*)$",
        regex::escape(C_REMOTE_SCHEME)
    ))
    .expect("remote uri pattern is a valid regex")
});

/// Whether `path` carries the object store scheme (case-sensitive).
pub fn is_remote(path: &str) -> bool {
    path.starts_with(C_REMOTE_SCHEME)
}

/// Split `s3://<bucket>/<key>` into `(bucket, key)`.
///
/// Bucket names are limited to lowercase letters, digits, dots and hyphens.
/// The key may be empty only when the URI ends right after `<bucket>/`.
pub fn parse_remote_uri(uri: &str) -> Result<(String, String), TransferTreeError> {
    let Some(caps) = RE_REMOTE_URI.captures(uri) else {
        return Err(TransferTreeError::InvalidUri {
            uri: uri.to_string(),
        });
    };
    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Build a [`EnumLocation`] from a raw caller-supplied path.
pub fn resolve_location(raw: &str) -> Result<EnumLocation, TransferTreeError> {
    if is_remote(raw) {
        let (bucket, key) = parse_remote_uri(raw)?;
        return Ok(EnumLocation::Remote { bucket, key });
    }
    Ok(EnumLocation::Local {
        path: PathBuf::from(raw),
    })
}

/// Whether a location denotes a whole subtree.
///
/// Remote: the URI ends with `/`. Local: the resolved path is an existing
/// directory; missing paths report `false` and surface later as transfer
/// failures.
pub fn is_directory_like(location: &EnumLocation, fs_local: &dyn LocalFilesystem) -> bool {
    match location {
        EnumLocation::Remote { key, .. } => key.is_empty() || key.ends_with('/'),
        EnumLocation::Local { path } => fs_local.is_directory(&absolutize_path(path)),
    }
}

/// Drop one trailing `/`, if present.
pub fn trim_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Second-to-last `/`-delimited token of `path`, or `""` for a bare name.
///
/// `data/x/a.txt` and `data/x/` both yield `x`.
pub fn extract_immediate_prefix(path: &str) -> &str {
    let l_parts: Vec<&str> = path.split('/').collect();
    if l_parts.len() > 1 {
        return l_parts[l_parts.len() - 2];
    }
    ""
}

/// Anchor segment used to rebase every member of one invocation.
///
/// Computed once from the original source argument: the immediate prefix of
/// a remote key or local file path, or the base name of a local directory.
pub fn derive_immediate_prefix(source: &EnumLocation, if_source_dir_like: bool) -> String {
    match source {
        EnumLocation::Remote { key, .. } => extract_immediate_prefix(key).to_string(),
        EnumLocation::Local { path } if if_source_dir_like => absolutize_path(path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default(),
        EnumLocation::Local { path } => {
            extract_immediate_prefix(&path.to_string_lossy()).to_string()
        }
    }
}
