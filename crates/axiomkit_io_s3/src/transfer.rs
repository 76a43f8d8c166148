//! Top-level copy/move/list/remove orchestration.
//!
//! Pipeline per copy/move call:
//! route check -> plan -> enumerate -> filter -> map -> dispatch (serial or pool).

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::classify::resolve_location;
use crate::delete::remove_remote;
use crate::dispatch::{SpecDispatchOutcome, SpecTransferTask, dispatch_member};
use crate::enumerate::{enumerate_members, list_remote_objects};
use crate::localfs::LocalFilesystem;
use crate::mapper::{derive_transfer_plan, map_destination};
use crate::report::{ReportTransfer, ReportTransferBuilder};
use crate::spec::{
    EnumLocation, EnumTransferRoute, SpecTransferOptions, SpecTransferRequest, TransferTreeError,
};
use crate::store::{ObjectStore, SpecObjectInfo};
use crate::util::{SpecTransferPatterns, calculate_worker_limit};

/// Transfer engine bound to one object store and one local filesystem.
///
/// Options and patterns are validated once at construction, before any I/O.
///
/// # Examples
///
/// ```
/// use axiomkit_io_s3::{MemoryObjectStore, SpecTransferOptions, StdLocalFilesystem, TransferSession};
///
/// let store = MemoryObjectStore::new();
/// store.put_object("b", "data/x/a.txt", "hello").unwrap();
///
/// let session =
///     TransferSession::new(&store, &StdLocalFilesystem, SpecTransferOptions::default()).unwrap();
/// let report = session.copy_objects("s3://b/data/x/a.txt", "s3://b/out/").unwrap();
///
/// assert_eq!(report.cnt_transferred, 1);
/// assert_eq!(session.list_objects("s3://b/out/").unwrap(), vec!["out/a.txt"]);
/// ```
pub struct TransferSession<'a> {
    store: &'a dyn ObjectStore,
    fs_local: &'a dyn LocalFilesystem,
    spec_options: SpecTransferOptions,
    spec_pats: SpecTransferPatterns,
    n_workers_max: usize,
}

impl<'a> TransferSession<'a> {
    /// Validate `spec_options`, compile its patterns and bind the capabilities.
    pub fn new(
        store: &'a dyn ObjectStore,
        fs_local: &'a dyn LocalFilesystem,
        spec_options: SpecTransferOptions,
    ) -> Result<Self, TransferTreeError> {
        spec_options.validate()?;
        let spec_pats = SpecTransferPatterns::from_raw(
            spec_options.patterns_include.as_deref(),
            spec_options.patterns_exclude.as_deref(),
            spec_options.rule_pattern,
        )?;
        let n_workers_max = calculate_worker_limit(spec_options.num_workers_max);
        Ok(Self {
            store,
            fs_local,
            spec_options,
            spec_pats,
            n_workers_max,
        })
    }

    /// Validated options this session runs with.
    pub fn options(&self) -> &SpecTransferOptions {
        &self.spec_options
    }

    /// Copy a file, object, directory or prefix.
    pub fn copy_objects(&self, src: &str, dst: &str) -> Result<ReportTransfer, TransferTreeError> {
        self.transfer(&SpecTransferRequest {
            source: resolve_location(src)?,
            destination: resolve_location(dst)?,
            if_move: false,
        })
    }

    /// Copy, then delete each source member once its own copy succeeded.
    pub fn move_objects(&self, src: &str, dst: &str) -> Result<ReportTransfer, TransferTreeError> {
        self.transfer(&SpecTransferRequest {
            source: resolve_location(src)?,
            destination: resolve_location(dst)?,
            if_move: true,
        })
    }

    /// Run one already-classified request.
    ///
    /// The first failing member aborts the call; members already transferred
    /// (and, for moves, already deleted) stay that way.
    pub fn transfer(
        &self,
        spec_request: &SpecTransferRequest,
    ) -> Result<ReportTransfer, TransferTreeError> {
        EnumTransferRoute::derive(&spec_request.source, &spec_request.destination)?;
        let c_operation = if spec_request.if_move { "move" } else { "copy" };

        let spec_plan = derive_transfer_plan(spec_request, self.fs_local);
        let l_members = enumerate_members(
            &spec_request.source,
            self.store,
            self.fs_local,
            &self.spec_options,
        )?;

        let mut builder_report = ReportTransferBuilder::default();
        builder_report.add_counts(&["cnt_listed"], l_members.len() as u64);
        if l_members.is_empty() {
            info!(src = %spec_request.source, "requested object does not exist");
            return Ok(builder_report.build());
        }

        let mut l_tasks = Vec::with_capacity(l_members.len());
        for member in &l_members {
            if self.spec_pats.should_exclude(member.base_name()) {
                builder_report.add_skipped();
                continue;
            }
            builder_report.add_matched();
            let destination = map_destination(&spec_plan, &member.name);
            l_tasks.push(SpecTransferTask::from_member(
                &spec_request.source,
                member,
                destination,
            ));
        }

        if self.spec_options.if_dry_run {
            for spec_task in &l_tasks {
                info!(
                    operation = c_operation,
                    src = %spec_task.source,
                    dst = %spec_task.destination,
                    "(dry run) transfer"
                );
                builder_report.add_skipped();
            }
        } else {
            self.flush_transfer_tasks(l_tasks, spec_request.if_move, &mut builder_report)?;
        }

        let report = builder_report.build();
        info!(
            operation = c_operation,
            src = %spec_request.source,
            dst = %spec_request.destination,
            "{report}"
        );
        Ok(report)
    }

    fn flush_transfer_tasks(
        &self,
        l_tasks: Vec<SpecTransferTask>,
        if_move: bool,
        builder_report: &mut ReportTransferBuilder,
    ) -> Result<(), TransferTreeError> {
        if l_tasks.is_empty() {
            return Ok(());
        }

        let run_task = |spec_task: &SpecTransferTask| {
            dispatch_member(self.store, self.fs_local, spec_task, if_move)
        };
        let apply_outcomes =
            |l_outcomes: Vec<SpecDispatchOutcome>, builder_report: &mut ReportTransferBuilder| {
                for outcome in l_outcomes {
                    builder_report.add_transferred();
                    if outcome.if_deleted {
                        builder_report.add_deleted();
                    }
                }
            };

        if self.n_workers_max <= 1 {
            let l_outcomes = l_tasks.iter().map(run_task).collect::<Result<Vec<_>, _>>()?;
            apply_outcomes(l_outcomes, builder_report);
            return Ok(());
        }

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(self.n_workers_max)
            .build();
        let Ok(thread_pool) = thread_pool else {
            let c_warning = format!(
                "Failed to initialize thread pool (workers={}); fallback to serial transfer.",
                self.n_workers_max
            );
            warn!("{c_warning}");
            builder_report.add_warning(c_warning);
            let l_outcomes = l_tasks.iter().map(run_task).collect::<Result<Vec<_>, _>>()?;
            apply_outcomes(l_outcomes, builder_report);
            return Ok(());
        };

        let l_outcomes = thread_pool.install(|| {
            l_tasks
                .par_iter()
                .map(run_task)
                .collect::<Result<Vec<_>, _>>()
        })?;
        apply_outcomes(l_outcomes, builder_report);
        Ok(())
    }

    /// Keys under a remote key or prefix, in store order.
    pub fn list_objects(&self, uri: &str) -> Result<Vec<String>, TransferTreeError> {
        Ok(self
            .list_objects_extended(uri)?
            .into_iter()
            .map(|spec_info| spec_info.key)
            .collect())
    }

    /// Size, modification time and key of every object under `uri`.
    pub fn list_objects_extended(
        &self,
        uri: &str,
    ) -> Result<Vec<SpecObjectInfo>, TransferTreeError> {
        let EnumLocation::Remote { bucket, key } = resolve_location(uri)? else {
            return Err(TransferTreeError::InvalidUri {
                uri: uri.to_string(),
            });
        };
        let l_objects: Vec<SpecObjectInfo> =
            list_remote_objects(self.store, &bucket, &key, &self.spec_options)?
                .into_iter()
                .filter(|spec_info| !self.spec_pats.should_exclude(base_name(&spec_info.key)))
                .collect();
        if l_objects.is_empty() {
            info!(uri, "requested object does not exist");
        }
        Ok(l_objects)
    }

    /// Delete every object under a remote key or prefix.
    pub fn remove_objects(&self, uri: &str) -> Result<ReportTransfer, TransferTreeError> {
        let target = resolve_location(uri)?;
        let (n_listed, n_deleted) = remove_remote(self.store, &target, &self.spec_options, |key| {
            !self.spec_pats.should_exclude(base_name(key))
        })?;

        let mut builder_report = ReportTransferBuilder::default();
        builder_report.add_counts(&["cnt_listed"], n_listed as u64);
        builder_report.add_counts(&["cnt_deleted"], n_deleted as u64);
        builder_report.add_counts(&["cnt_skipped"], (n_listed - n_deleted) as u64);
        let report = builder_report.build();
        info!(operation = "remove", target = %target, "{report}");
        Ok(report)
    }
}

fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
