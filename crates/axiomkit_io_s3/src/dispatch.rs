//! Per-member route selection, transfer and optional source delete.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::delete::delete_keys_chunked;
use crate::localfs::LocalFilesystem;
use crate::primitive::{copy_local_to_remote, copy_remote_to_local, copy_remote_to_remote};
use crate::spec::{
    EnumFailureCause, EnumLocation, EnumTransferRoute, SpecMember, TransferTreeError,
};
use crate::store::ObjectStore;

/// One mapped unit of work, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTransferTask {
    /// Concrete member source.
    pub source: EnumLocation,
    /// Mapped member destination.
    pub destination: EnumLocation,
}

impl SpecTransferTask {
    /// Task for `member` enumerated under `source_root`.
    pub fn from_member(
        source_root: &EnumLocation,
        member: &SpecMember,
        destination: EnumLocation,
    ) -> Self {
        let source = match source_root {
            EnumLocation::Remote { bucket, .. } => EnumLocation::Remote {
                bucket: bucket.clone(),
                key: member.name.clone(),
            },
            EnumLocation::Local { .. } => EnumLocation::Local {
                path: PathBuf::from(&member.name),
            },
        };
        Self {
            source,
            destination,
        }
    }
}

/// Result of one dispatched member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecDispatchOutcome {
    /// The source was removed after its copy committed.
    pub if_deleted: bool,
}

/// Copy one member, then delete its source when `if_move` is set.
///
/// The source is only deleted after the copy returned success; a delete
/// failure therefore leaves the data at both ends.
pub fn dispatch_member(
    store: &dyn ObjectStore,
    fs_local: &dyn LocalFilesystem,
    spec_task: &SpecTransferTask,
    if_move: bool,
) -> Result<SpecDispatchOutcome, TransferTreeError> {
    let route = EnumTransferRoute::derive(&spec_task.source, &spec_task.destination)?;
    info!(
        operation = if if_move { "move" } else { "copy" },
        src = %spec_task.source,
        dst = %spec_task.destination,
        "transfer"
    );

    match (route, &spec_task.source, &spec_task.destination) {
        (
            EnumTransferRoute::RemoteToRemote,
            EnumLocation::Remote {
                bucket: bucket_src,
                key: key_src,
            },
            EnumLocation::Remote {
                bucket: bucket_dst,
                key: key_dst,
            },
        ) => copy_remote_to_remote(store, bucket_src, key_src, bucket_dst, key_dst)?,
        (
            EnumTransferRoute::RemoteToLocal,
            EnumLocation::Remote { bucket, key },
            EnumLocation::Local { path },
        ) => {
            fs_local
                .ensure_parent_dirs(path)
                .map_err(|e| TransferTreeError::Transfer {
                    src: spec_task.source.to_string(),
                    dst: spec_task.destination.to_string(),
                    cause: EnumFailureCause::Io(e),
                })?;
            copy_remote_to_local(store, bucket, key, path)?;
        }
        (
            EnumTransferRoute::LocalToRemote,
            EnumLocation::Local { path },
            EnumLocation::Remote { bucket, key },
        ) => copy_local_to_remote(store, path, bucket, key)?,
        _ => {
            return Err(TransferTreeError::UnsupportedOperation {
                src: spec_task.source.to_string(),
                dst: spec_task.destination.to_string(),
            });
        }
    }

    if !if_move {
        return Ok(SpecDispatchOutcome::default());
    }
    delete_source(store, fs_local, &spec_task.source)?;
    Ok(SpecDispatchOutcome { if_deleted: true })
}

fn delete_source(
    store: &dyn ObjectStore,
    fs_local: &dyn LocalFilesystem,
    source: &EnumLocation,
) -> Result<(), TransferTreeError> {
    match source {
        EnumLocation::Remote { bucket, key } => {
            delete_keys_chunked(store, bucket, &[key.clone()], 1, &source.to_string())?;
            Ok(())
        }
        EnumLocation::Local { path } => remove_local_file(fs_local, path),
    }
}

fn remove_local_file(fs_local: &dyn LocalFilesystem, path: &Path) -> Result<(), TransferTreeError> {
    match fs_local.remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TransferTreeError::Delete {
            target: path.display().to_string(),
            cause: EnumFailureCause::Io(e),
        }),
    }
}
