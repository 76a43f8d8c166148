//! Transfer specification models and top-level error types.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::conf::{
    C_REMOTE_SCHEME, N_DELETE_BATCH_SIZE_MAX, N_LIST_PAGE_SIZE_DEFAULT, N_LIST_PAGE_SIZE_MAX,
};
use crate::store::{ObjectStoreError, SpecDeleteFailure};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumTransferPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

impl FromStr for EnumTransferPatternMode {
    type Err = TransferTreeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "glob" => Ok(Self::Glob),
            "regex" => Ok(Self::Regex),
            "literal" => Ok(Self::Literal),
            _ => Err(TransferTreeError::InvalidOption(format!(
                "Invalid pattern strategy: `{value}`. Expected one of: ['glob', 'regex', 'literal']"
            ))),
        }
    }
}

/// One side of the unified namespace.
///
/// Built once at the API boundary; downstream code branches on the tag and
/// never re-parses the original string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumLocation {
    /// Path on the local filesystem, kept as given by the caller.
    Local {
        /// Local path (file or directory).
        path: PathBuf,
    },
    /// Object or prefix in the object store.
    Remote {
        /// Bucket name.
        bucket: String,
        /// Key without the scheme; a trailing `/` marks a prefix.
        key: String,
    },
}

impl EnumLocation {
    /// Whether this location lives in the object store.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Display for EnumLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { path } => write!(f, "{}", path.display()),
            Self::Remote { bucket, key } => write!(f, "{C_REMOTE_SCHEME}{bucket}/{key}"),
        }
    }
}

/// Single-object transfer route selected per (source, destination) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTransferRoute {
    /// Server-side copy inside the object store.
    RemoteToRemote,
    /// Download to the local filesystem.
    RemoteToLocal,
    /// Upload from the local filesystem.
    LocalToRemote,
}

impl EnumTransferRoute {
    /// Select the route for a source/destination pair.
    ///
    /// Local-to-local requests are rejected before any I/O happens.
    pub fn derive(
        source: &EnumLocation,
        destination: &EnumLocation,
    ) -> Result<Self, TransferTreeError> {
        match (source.is_remote(), destination.is_remote()) {
            (true, true) => Ok(Self::RemoteToRemote),
            (true, false) => Ok(Self::RemoteToLocal),
            (false, true) => Ok(Self::LocalToRemote),
            (false, false) => Err(TransferTreeError::UnsupportedOperation {
                src: source.to_string(),
                dst: destination.to_string(),
            }),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndOptions

/// One top-level copy or move invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTransferRequest {
    /// Source file, directory, object or prefix.
    pub source: EnumLocation,
    /// Destination file, directory, object or prefix.
    pub destination: EnumLocation,
    /// Delete each source member after its copy succeeds.
    pub if_move: bool,
}

/// One enumerated unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMember {
    /// Full object key (remote) or file path as enumerated (local).
    pub name: String,
    /// Object size for remote members; `None` for local files.
    pub size: Option<u64>,
}

impl SpecMember {
    /// Remote member with its listed size.
    pub fn remote(key: impl Into<String>, size: u64) -> Self {
        Self {
            name: key.into(),
            size: Some(size),
        }
    }

    /// Local file member.
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            name: path.into(),
            size: None,
        }
    }

    /// Last `/`-delimited component of the member name.
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Input options for [`crate::transfer::TransferSession`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpecTransferOptions {
    /// Keys requested per listing page.
    pub page_size_list: usize,
    /// Keys sent per bulk-delete request.
    pub batch_size_delete: usize,
    /// Maximum worker threads for the transfer stage; `Some(1)` is serial.
    pub num_workers_max: Option<usize>,
    /// Drop zero-size objects while listing.
    ///
    /// When disabled, zero-size keys ending in `/` are still dropped since
    /// they can only be folder placeholders.
    pub if_skip_empty_objects: bool,
    /// Include patterns applied to member base names.
    pub patterns_include: Option<Vec<String>>,
    /// Exclude patterns applied to member base names.
    pub patterns_exclude: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumTransferPatternMode,
    /// Enumerate and map only; record what would happen.
    pub if_dry_run: bool,
}

impl Default for SpecTransferOptions {
    fn default() -> Self {
        Self {
            page_size_list: N_LIST_PAGE_SIZE_DEFAULT,
            batch_size_delete: N_DELETE_BATCH_SIZE_MAX,
            num_workers_max: Some(1),
            if_skip_empty_objects: true,
            patterns_include: None,
            patterns_exclude: None,
            rule_pattern: EnumTransferPatternMode::Glob,
            if_dry_run: false,
        }
    }
}

impl SpecTransferOptions {
    /// Check numeric option ranges.
    pub fn validate(&self) -> Result<(), TransferTreeError> {
        if !(1..=N_LIST_PAGE_SIZE_MAX).contains(&self.page_size_list) {
            return Err(TransferTreeError::InvalidOption(format!(
                "Arg `page_size_list` must be within 1..={N_LIST_PAGE_SIZE_MAX}, got {}.",
                self.page_size_list
            )));
        }
        if !(1..=N_DELETE_BATCH_SIZE_MAX).contains(&self.batch_size_delete) {
            return Err(TransferTreeError::InvalidOption(format!(
                "Arg `batch_size_delete` must be within 1..={N_DELETE_BATCH_SIZE_MAX}, got {}.",
                self.batch_size_delete
            )));
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Underlying failure wrapped by listing, transfer and delete errors.
#[derive(Debug, Error)]
pub enum EnumFailureCause {
    /// Object store request failed.
    #[error(transparent)]
    Store(#[from] ObjectStoreError),
    /// Local filesystem operation failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The store accepted the request but refused some keys.
    #[error("{} key(s) rejected by store, first: {}", .0.len(), describe_first_failure(.0))]
    Rejected(Vec<SpecDeleteFailure>),
}

fn describe_first_failure(l_failures: &[SpecDeleteFailure]) -> String {
    match l_failures.first() {
        Some(failure) => format!("{} ({})", failure.key, failure.message),
        None => "<none>".to_string(),
    }
}

/// Top-level call failures. Every variant is fatal to the current invocation.
#[derive(Debug, Error)]
pub enum TransferTreeError {
    /// Remote URI does not match `s3://<bucket>/<key>`.
    #[error("Invalid remote uri: {uri}")]
    InvalidUri {
        /// Offending input.
        uri: String,
    },
    /// Listing a source failed; nothing was transferred.
    #[error("Failed to list {location}: {cause}")]
    List {
        /// Listed location.
        location: String,
        /// Underlying failure.
        #[source]
        cause: EnumFailureCause,
    },
    /// Neither side is remote.
    #[error(
        "Neither {src} nor {dst} is in the object store; use local file utilities instead"
    )]
    UnsupportedOperation {
        /// Requested source.
        src: String,
        /// Requested destination.
        dst: String,
    },
    /// One member's copy, download or upload failed.
    #[error("Failed to transfer {src} -> {dst}: {cause}")]
    Transfer {
        /// Member source.
        src: String,
        /// Mapped member destination.
        dst: String,
        /// Underlying failure.
        #[source]
        cause: EnumFailureCause,
    },
    /// Deleting objects or a moved source failed.
    ///
    /// During a move the member's copy has already committed when this is
    /// returned, so the data exists at both ends.
    #[error("Failed to delete {target}: {cause}")]
    Delete {
        /// Deleted key, prefix or local file.
        target: String,
        /// Underlying failure.
        #[source]
        cause: EnumFailureCause,
    },
    /// Invalid include/exclude pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// Invalid option value.
    #[error("{0}")]
    InvalidOption(String),
    /// Reading an options document failed.
    #[error("Failed to load options {}: {message}", path.display())]
    OptionsLoadFailed {
        /// Options file path.
        path: PathBuf,
        /// Read or parse error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{
        EnumFailureCause, EnumLocation, EnumTransferPatternMode, EnumTransferRoute, SpecMember,
        SpecTransferOptions, TransferTreeError,
    };
    use crate::store::{ObjectStoreError, SpecDeleteFailure};

    fn remote(bucket: &str, key: &str) -> EnumLocation {
        EnumLocation::Remote {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    #[test]
    fn route_selection_covers_all_pairs() {
        let local = EnumLocation::Local {
            path: PathBuf::from("/tmp/a.txt"),
        };
        assert_eq!(
            EnumTransferRoute::derive(&remote("b", "k"), &remote("b", "o")).expect("route"),
            EnumTransferRoute::RemoteToRemote
        );
        assert_eq!(
            EnumTransferRoute::derive(&remote("b", "k"), &local).expect("route"),
            EnumTransferRoute::RemoteToLocal
        );
        assert_eq!(
            EnumTransferRoute::derive(&local, &remote("b", "k")).expect("route"),
            EnumTransferRoute::LocalToRemote
        );
        let err = EnumTransferRoute::derive(&local, &local).expect_err("local pair must fail");
        assert!(matches!(err, TransferTreeError::UnsupportedOperation { .. }));
    }

    #[test]
    fn location_display_renders_uri() {
        assert_eq!(remote("b", "data/x/").to_string(), "s3://b/data/x/");
    }

    #[test]
    fn member_base_name_takes_last_segment() {
        assert_eq!(SpecMember::remote("data/x/a.txt", 3).base_name(), "a.txt");
        assert_eq!(SpecMember::local("a.txt").base_name(), "a.txt");
    }

    #[test]
    fn pattern_mode_parses_known_values() {
        assert_eq!(
            "literal".parse::<EnumTransferPatternMode>().expect("parse"),
            EnumTransferPatternMode::Literal
        );
        assert!("fuzzy".parse::<EnumTransferPatternMode>().is_err());
    }

    #[test]
    fn options_validate_batch_size_range() {
        let spec_options = SpecTransferOptions {
            batch_size_delete: 1001,
            ..SpecTransferOptions::default()
        };
        assert!(matches!(
            spec_options.validate(),
            Err(TransferTreeError::InvalidOption(_))
        ));
        assert!(SpecTransferOptions::default().validate().is_ok());
    }

    #[test]
    fn delete_and_transfer_errors_are_distinguishable() {
        let err_transfer = TransferTreeError::Transfer {
            src: "a".to_string(),
            dst: "b".to_string(),
            cause: EnumFailureCause::Store(ObjectStoreError::Network("reset".to_string())),
        };
        let err_delete = TransferTreeError::Delete {
            target: "s3://b/k".to_string(),
            cause: EnumFailureCause::Rejected(vec![SpecDeleteFailure {
                key: "k".to_string(),
                message: "AccessDenied".to_string(),
            }]),
        };
        assert_eq!(
            err_transfer.to_string(),
            "Failed to transfer a -> b: Network error: reset"
        );
        assert_eq!(
            err_delete.to_string(),
            "Failed to delete s3://b/k: 1 key(s) rejected by store, first: k (AccessDenied)"
        );
    }
}
