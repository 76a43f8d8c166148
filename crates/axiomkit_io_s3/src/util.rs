use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumTransferPatternMode, TransferTreeError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeTransferPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecTransferPatterns {
    pub(crate) patterns_include: Option<TypeTransferPatternSeq>,
    pub(crate) patterns_exclude: Option<TypeTransferPatternSeq>,
}

impl SpecTransferPatterns {
    pub(crate) fn from_raw(
        patterns_include: Option<&[String]>,
        patterns_exclude: Option<&[String]>,
        rule_pattern: EnumTransferPatternMode,
    ) -> Result<Self, TransferTreeError> {
        Ok(Self {
            patterns_include: _compile(patterns_include, rule_pattern)?,
            patterns_exclude: _compile(patterns_exclude, rule_pattern)?,
        })
    }

    /// Whether a member base name is filtered out.
    pub(crate) fn should_exclude(&self, value: &str) -> bool {
        let b_included = match &self.patterns_include {
            None => true,
            Some(patterns) => _is_pattern_matching(value, patterns),
        };
        let b_excluded = match &self.patterns_exclude {
            None => false,
            Some(patterns) => _is_pattern_matching(value, patterns),
        };
        !b_included || b_excluded
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumTransferPatternMode,
) -> Result<Option<TypeTransferPatternSeq>, TransferTreeError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumTransferPatternMode::Literal => {
            Ok(Some(TypeTransferPatternSeq::Literal(patterns.to_vec())))
        }
        EnumTransferPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| {
                        TransferTreeError::InvalidPattern(format!(
                            "Invalid pattern in include/exclude: {e}"
                        ))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeTransferPatternSeq::Glob(l_glob)))
        }
        EnumTransferPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| {
                    TransferTreeError::InvalidPattern(format!(
                        "Invalid pattern in include/exclude: {e}"
                    ))
                })?;
                l_regex.push(regex);
            }
            Ok(Some(TypeTransferPatternSeq::Regex(l_regex)))
        }
    }
}

fn _is_pattern_matching(value: &str, patterns: &TypeTransferPatternSeq) -> bool {
    match patterns {
        TypeTransferPatternSeq::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
        TypeTransferPatternSeq::Glob(v) => v.iter().any(|p| p.is_match(value)),
        TypeTransferPatternSeq::Regex(v) => v.iter().any(|p| p.is_match(value)),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Helpers

pub(crate) fn absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
