//! Destination rebasing for enumerated members.
//!
//! Copying `src-dir/` into `dest/` reproduces the *children* of `src-dir`
//! under `dest/`, not `src-dir` itself.

use std::path::PathBuf;

use crate::classify::{derive_immediate_prefix, is_directory_like, trim_trailing_slash};
use crate::localfs::LocalFilesystem;
use crate::spec::{EnumLocation, SpecTransferRequest};

/// Per-invocation values derived once from the original arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTransferPlan {
    /// Original source root.
    pub source: EnumLocation,
    /// Original destination root.
    pub destination: EnumLocation,
    /// Source or destination is directory-like, so members fan out.
    pub if_fan_out: bool,
    /// Anchor segment stripped from every member.
    pub immediate_prefix: String,
}

/// Resolve directory-likeness and the immediate prefix for one request.
pub fn derive_transfer_plan(
    spec_request: &SpecTransferRequest,
    fs_local: &dyn LocalFilesystem,
) -> SpecTransferPlan {
    let if_source_dir_like = is_directory_like(&spec_request.source, fs_local);
    let if_destination_dir_like = is_directory_like(&spec_request.destination, fs_local);
    SpecTransferPlan {
        source: spec_request.source.clone(),
        destination: spec_request.destination.clone(),
        if_fan_out: if_source_dir_like || if_destination_dir_like,
        immediate_prefix: derive_immediate_prefix(&spec_request.source, if_source_dir_like),
    }
}

/// Strip everything through the last `"<immediate_prefix>/"` in `member`.
///
/// An empty prefix, or a member that does not contain the anchor, is
/// returned unchanged.
pub fn derive_relative_name<'a>(member: &'a str, immediate_prefix: &str) -> &'a str {
    if immediate_prefix.is_empty() {
        return member;
    }
    let c_anchor = format!("{immediate_prefix}/");
    match member.rfind(&c_anchor) {
        Some(n_idx) => &member[n_idx + c_anchor.len()..],
        None => member,
    }
}

/// Final destination of one member.
///
/// Single-file to single-file transfers keep the destination root verbatim;
/// fan-out transfers append the member's relative name to the root.
pub fn map_destination(spec_plan: &SpecTransferPlan, member: &str) -> EnumLocation {
    if !spec_plan.if_fan_out {
        return spec_plan.destination.clone();
    }

    let c_relative = derive_relative_name(member, &spec_plan.immediate_prefix);
    match &spec_plan.destination {
        EnumLocation::Remote { bucket, key } => {
            let c_root = trim_trailing_slash(key);
            let key_dst = if c_root.is_empty() {
                c_relative.to_string()
            } else {
                format!("{c_root}/{c_relative}")
            };
            EnumLocation::Remote {
                bucket: bucket.clone(),
                key: key_dst,
            }
        }
        EnumLocation::Local { path } => {
            let c_root = path.to_string_lossy();
            EnumLocation::Local {
                path: PathBuf::from(format!("{}/{c_relative}", trim_trailing_slash(&c_root))),
            }
        }
    }
}
