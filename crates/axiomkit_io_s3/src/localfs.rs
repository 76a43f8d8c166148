//! Local filesystem capability and its `std::fs` implementation.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Local filesystem operations required by the transfer engine.
pub trait LocalFilesystem: Send + Sync {
    /// Whether `path` is an existing directory. Missing paths are `false`.
    fn is_directory(&self, path: &Path) -> bool;

    /// Every regular file below `path_dir`, depth-first, directories excluded.
    fn list_tree_files(&self, path_dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create any missing parent directories of `path_file`.
    fn ensure_parent_dirs(&self, path_file: &Path) -> io::Result<()>;

    /// Remove one file.
    fn remove_file(&self, path_file: &Path) -> io::Result<()>;
}

/// [`LocalFilesystem`] backed by `std::fs`.
///
/// Directory entries are visited in name order so repeated runs over the same
/// tree enumerate the same sequence. Symlinked directories are followed;
/// a directory reached twice through links is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdLocalFilesystem;

#[derive(Debug)]
struct SpecWalkEntry {
    path_entry: PathBuf,
    name_entry: String,
    if_is_dir: bool,
}

impl StdLocalFilesystem {
    fn walk_directory(
        &self,
        path_root: &Path,
        set_visited_dirs: &mut HashSet<(u64, u64)>,
        l_files: &mut Vec<PathBuf>,
    ) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let stat_root = fs::metadata(path_root)?;
            if !set_visited_dirs.insert((stat_root.dev(), stat_root.ino())) {
                warn!(path = %path_root.display(), "symlink loop detected; directory skipped");
                return Ok(());
            }
        }
        #[cfg(not(unix))]
        {
            let _ = &set_visited_dirs;
        }

        let mut l_entries: Vec<SpecWalkEntry> = Vec::new();
        for entry_res in fs::read_dir(path_root)? {
            let entry = entry_res?;
            let path_entry = entry.path();
            let cfg_file_type = entry.file_type()?;
            let if_is_dir =
                cfg_file_type.is_dir() || (cfg_file_type.is_symlink() && path_entry.is_dir());
            if !if_is_dir && !cfg_file_type.is_file() && !cfg_file_type.is_symlink() {
                warn!(path = %path_entry.display(), "special file skipped");
                continue;
            }
            l_entries.push(SpecWalkEntry {
                path_entry,
                name_entry: entry.file_name().to_string_lossy().to_string(),
                if_is_dir,
            });
        }
        l_entries.sort_by(|a, b| a.name_entry.cmp(&b.name_entry));

        for spec_entry in l_entries {
            if spec_entry.if_is_dir {
                self.walk_directory(&spec_entry.path_entry, set_visited_dirs, l_files)?;
            } else {
                l_files.push(spec_entry.path_entry);
            }
        }
        Ok(())
    }
}

impl LocalFilesystem for StdLocalFilesystem {
    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_tree_files(&self, path_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut set_visited_dirs = HashSet::new();
        let mut l_files = Vec::new();
        self.walk_directory(path_dir, &mut set_visited_dirs, &mut l_files)?;
        Ok(l_files)
    }

    fn ensure_parent_dirs(&self, path_file: &Path) -> io::Result<()> {
        match path_file.parent() {
            Some(path_parent) if !path_parent.as_os_str().is_empty() => {
                fs::create_dir_all(path_parent)
            }
            _ => Ok(()),
        }
    }

    fn remove_file(&self, path_file: &Path) -> io::Result<()> {
        fs::remove_file(path_file)
    }
}
