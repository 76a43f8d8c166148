//! Transfer constants and default option factories.

use std::fs;
use std::path::Path;

use crate::spec::{SpecTransferOptions, TransferTreeError};

/// URI scheme prefix that marks a path as living in the object store.
pub const C_REMOTE_SCHEME: &str = "s3://";
/// Keys requested per listing page unless overridden.
pub const N_LIST_PAGE_SIZE_DEFAULT: usize = 100;
/// Largest page the store accepts for one listing request.
pub const N_LIST_PAGE_SIZE_MAX: usize = 1000;
/// Largest key count the store accepts for one bulk-delete request.
pub const N_DELETE_BATCH_SIZE_MAX: usize = 1000;
/// `strftime` layout used by extended listings.
pub const C_LIST_TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Notebook resource metadata file written by the hosting platform.
pub const C_WORK_AREA_METADATA_PATH: &str = "/opt/ml/metadata/resource-metadata.json";
/// Tag key whose value names the per-principal work-area prefix.
pub const C_PRINCIPAL_TAG_KEY_DEFAULT: &str = "mufg:principal";
/// Suffix of the per-account work-area bucket name.
pub const C_WORK_AREA_BUCKET_SUFFIX: &str = "sagemaker-work-area";

/// Build default transfer options.
pub fn derive_default_transfer_options() -> SpecTransferOptions {
    SpecTransferOptions::default()
}

/// Load transfer options from a JSON document.
///
/// Missing fields fall back to [`SpecTransferOptions::default`]. The loaded
/// options are validated before being returned.
pub fn load_transfer_options<P: AsRef<Path>>(
    path_options: P,
) -> Result<SpecTransferOptions, TransferTreeError> {
    let path_options = path_options.as_ref();
    let raw_text =
        fs::read_to_string(path_options).map_err(|e| TransferTreeError::OptionsLoadFailed {
            path: path_options.to_path_buf(),
            message: e.to_string(),
        })?;
    let spec_options: SpecTransferOptions =
        serde_json::from_str(&raw_text).map_err(|e| TransferTreeError::OptionsLoadFailed {
            path: path_options.to_path_buf(),
            message: e.to_string(),
        })?;
    spec_options.validate()?;
    Ok(spec_options)
}
