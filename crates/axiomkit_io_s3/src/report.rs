//! Transfer report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one copy/move/remove run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportTransfer {
    /// Members returned by enumeration.
    pub cnt_listed: u64,
    /// Members left after include/exclude filtering.
    pub cnt_matched: u64,
    /// Members whose copy committed.
    pub cnt_transferred: u64,
    /// Sources or objects deleted.
    pub cnt_deleted: u64,
    /// Members filtered out or not executed (dry run).
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during the run.
    pub warnings: Vec<String>,
}

impl ReportTransfer {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_listed".to_string(), self.cnt_listed);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_transferred".to_string(), self.cnt_transferred);
        dict_counts.insert("cnt_deleted".to_string(), self.cnt_deleted);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} listed={} matched={} transferred={} deleted={} skipped={} warnings={}",
            dict_counts["cnt_listed"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_transferred"],
            dict_counts["cnt_deleted"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[TRANSFER]"))
    }
}

/// Mutable accumulator for transfer statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportTransferBuilder {
    /// See [`ReportTransfer::cnt_listed`].
    pub cnt_listed: u64,
    /// See [`ReportTransfer::cnt_matched`].
    pub cnt_matched: u64,
    /// See [`ReportTransfer::cnt_transferred`].
    pub cnt_transferred: u64,
    /// See [`ReportTransfer::cnt_deleted`].
    pub cnt_deleted: u64,
    /// See [`ReportTransfer::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportTransfer::warnings`].
    pub warnings: Vec<String>,
}

impl ReportTransferBuilder {
    /// Increment one or more named counters by `value`.
    ///
    /// Unknown names are ignored.
    pub fn add_counts(&mut self, field_names: &[&str], value: u64) {
        for field_name in field_names {
            match *field_name {
                "cnt_listed" => self.cnt_listed += value,
                "cnt_matched" => self.cnt_matched += value,
                "cnt_transferred" => self.cnt_transferred += value,
                "cnt_deleted" => self.cnt_deleted += value,
                "cnt_skipped" => self.cnt_skipped += value,
                _ => {}
            }
        }
    }

    /// Increment matched count by one.
    pub fn add_matched(&mut self) {
        self.cnt_matched += 1;
    }

    /// Increment transferred count by one.
    pub fn add_transferred(&mut self) {
        self.cnt_transferred += 1;
    }

    /// Increment deleted count by one.
    pub fn add_deleted(&mut self) {
        self.cnt_deleted += 1;
    }

    /// Increment skipped count by one.
    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportTransfer {
        ReportTransfer {
            cnt_listed: self.cnt_listed,
            cnt_matched: self.cnt_matched,
            cnt_transferred: self.cnt_transferred,
            cnt_deleted: self.cnt_deleted,
            cnt_skipped: self.cnt_skipped,
            warnings: self.warnings,
        }
    }
}
