//! `axiomkit_io_s3` v1:
//! Rust-side local/object-store transfer engine.
//!
//! Architecture:
//! - `conf`      : constants, default options, option loading
//! - `spec`      : locations/options/errors
//! - `classify`  : local-vs-remote and file-vs-prefix classification
//! - `store`     : object store capability
//! - `memory`    : in-process object store
//! - `localfs`   : local filesystem capability
//! - `enumerate` : member enumeration (tree walk / paginated listing)
//! - `mapper`    : destination rebasing
//! - `primitive` : single-object transfers
//! - `dispatch`  : per-member route selection and move deletes
//! - `delete`    : chunked bulk delete
//! - `transfer`  : top-level copy/move/list/remove orchestration
//! - `report`    : run-time report model
//! - `workarea`  : notebook work-area resolution
//! - `util`      : shared helper functions

pub mod classify;
pub mod conf;
pub mod delete;
pub mod dispatch;
pub mod enumerate;
pub mod localfs;
pub mod mapper;
pub mod memory;
pub mod primitive;
pub mod report;
pub mod spec;
pub mod store;
pub mod transfer;
pub mod workarea;
mod util;

#[cfg(test)]
mod test_support;

pub use classify::{
    derive_immediate_prefix, extract_immediate_prefix, is_directory_like, is_remote,
    parse_remote_uri, resolve_location, trim_trailing_slash,
};
pub use conf::{
    C_LIST_TIMESTAMP_FORMAT, C_PRINCIPAL_TAG_KEY_DEFAULT, C_REMOTE_SCHEME,
    C_WORK_AREA_METADATA_PATH, N_DELETE_BATCH_SIZE_MAX, N_LIST_PAGE_SIZE_DEFAULT,
    N_LIST_PAGE_SIZE_MAX, derive_default_transfer_options, load_transfer_options,
};
pub use localfs::{LocalFilesystem, StdLocalFilesystem};
pub use memory::MemoryObjectStore;
pub use report::{ReportTransfer, ReportTransferBuilder};
pub use spec::{
    EnumFailureCause, EnumLocation, EnumTransferPatternMode, EnumTransferRoute, SpecMember,
    SpecTransferOptions, SpecTransferRequest, TransferTreeError,
};
pub use store::{ObjectStore, ObjectStoreError, SpecDeleteFailure, SpecObjectInfo, SpecObjectPage};
pub use transfer::TransferSession;
pub use workarea::{
    NotebookMetadataSource, SpecCallerIdentity, SpecNotebookDescription, SpecResourceTag,
    SpecWorkArea, WorkAreaError, resolve_current_work_area, resolve_work_area,
};
