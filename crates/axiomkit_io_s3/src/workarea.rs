//! Notebook work-area resolution.
//!
//! A managed notebook exposes its own resource name/ARN in a metadata file.
//! From that, the notebook description, its tags and the caller identity, we
//! derive where training jobs launched from the notebook should run and
//! which bucket/prefix they should write to.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::conf::{
    C_PRINCIPAL_TAG_KEY_DEFAULT, C_REMOTE_SCHEME, C_WORK_AREA_BUCKET_SUFFIX,
    C_WORK_AREA_METADATA_PATH,
};

/// Work-area resolution failures.
#[derive(Debug, Error)]
pub enum WorkAreaError {
    #[error("Failed to read notebook metadata {}: {source}", path.display())]
    ReadMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse notebook metadata {}: {source}", path.display())]
    ParseMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A metadata-source call failed.
    #[error("Failed to {operation}: {message}")]
    Lookup { operation: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
struct SpecResourceMetadata {
    #[serde(rename = "ResourceName")]
    resource_name: String,
    #[serde(rename = "ResourceArn")]
    resource_arn: String,
}

/// Attributes of one notebook instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecNotebookDescription {
    pub subnet_id: String,
    pub kms_key_id: String,
    pub role_arn: String,
    pub security_groups: Vec<String>,
}

/// One resource tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecResourceTag {
    pub key: String,
    pub value: String,
}

/// Account and region of the current credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCallerIdentity {
    pub account: String,
    pub region: String,
}

/// Control-plane lookups needed to resolve a work area.
///
/// Implementations carry their own client configuration.
pub trait NotebookMetadataSource {
    fn describe_notebook_instance(
        &self,
        notebook_name: &str,
    ) -> Result<SpecNotebookDescription, WorkAreaError>;

    fn list_tags(&self, resource_arn: &str) -> Result<Vec<SpecResourceTag>, WorkAreaError>;

    fn caller_identity(&self) -> Result<SpecCallerIdentity, WorkAreaError>;
}

/// Resolved work-area properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecWorkArea {
    pub subnet_ids: Vec<String>,
    pub kms_key: String,
    /// Training role, derived from the notebook execution role.
    pub role: String,
    pub security_groups: Vec<String>,
    pub s3_bucket: String,
    /// Principal tag value; empty when the notebook carries no such tag.
    pub s3_prefix: String,
    pub principal_tag_value: String,
}

impl SpecWorkArea {
    /// `s3://<bucket>/<prefix>/`, or `s3://<bucket>/` without a prefix.
    pub fn to_remote_uri(&self) -> String {
        if self.s3_prefix.is_empty() {
            return format!("{C_REMOTE_SCHEME}{}/", self.s3_bucket);
        }
        format!(
            "{C_REMOTE_SCHEME}{}/{}/",
            self.s3_bucket,
            self.s3_prefix.trim_matches('/')
        )
    }
}

impl fmt::Display for SpecWorkArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{c_json}")
    }
}

/// Resolve the work area of the notebook described by `path_metadata`.
pub fn resolve_work_area<P: AsRef<Path>>(
    path_metadata: P,
    source: &dyn NotebookMetadataSource,
    principal_tag_key: &str,
) -> Result<SpecWorkArea, WorkAreaError> {
    let path_metadata = path_metadata.as_ref();
    let raw = fs::read_to_string(path_metadata).map_err(|e| WorkAreaError::ReadMetadata {
        path: path_metadata.to_path_buf(),
        source: e,
    })?;
    let spec_meta: SpecResourceMetadata =
        serde_json::from_str(&raw).map_err(|e| WorkAreaError::ParseMetadata {
            path: path_metadata.to_path_buf(),
            source: e,
        })?;
    debug!(notebook = spec_meta.resource_name.as_str(), "resolving work area");

    let spec_nb = source.describe_notebook_instance(&spec_meta.resource_name)?;
    let l_tags = source.list_tags(&spec_meta.resource_arn)?;
    let spec_identity = source.caller_identity()?;

    let principal_tag_value = l_tags
        .into_iter()
        .find(|tag| tag.key == principal_tag_key)
        .map(|tag| tag.value)
        .unwrap_or_default();

    Ok(SpecWorkArea {
        subnet_ids: vec![spec_nb.subnet_id],
        kms_key: spec_nb.kms_key_id,
        role: spec_nb.role_arn.replace("NotebookExecution", "Training"),
        security_groups: spec_nb.security_groups,
        s3_bucket: format!(
            "{}-{}-{C_WORK_AREA_BUCKET_SUFFIX}",
            spec_identity.account, spec_identity.region
        ),
        s3_prefix: principal_tag_value.clone(),
        principal_tag_value,
    })
}

/// Resolve the work area of the notebook this process runs on.
pub fn resolve_current_work_area(
    source: &dyn NotebookMetadataSource,
) -> Result<SpecWorkArea, WorkAreaError> {
    resolve_work_area(C_WORK_AREA_METADATA_PATH, source, C_PRINCIPAL_TAG_KEY_DEFAULT)
}
