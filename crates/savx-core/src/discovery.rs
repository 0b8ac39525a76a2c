//! Input discovery.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of SPSS save files, compared case-insensitively.
pub const SAV_EXTENSION: &str = "sav";

/// Whether `path` has a `.sav` extension (any case).
pub fn is_sav_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SAV_EXTENSION))
}

/// Expand files and directories into a sorted, deduplicated list of inputs.
///
/// Paths are compared as whole strings, so `a-b/x.sav` sorts before
/// `a/x.sav`.
///
/// Directories are walked recursively for `.sav` files. Anything else is
/// taken as given, so a wrong extension fails later as a per-item error.
/// Unreadable directory entries are logged and skipped.
pub fn resolve_inputs<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut found: BTreeSet<OsString> = BTreeSet::new();

    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            found.insert(path.as_os_str().to_os_string());
            continue;
        }

        for entry in WalkDir::new(path).follow_links(true) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_sav_file(entry.path()) => {
                    found.insert(entry.into_path().into_os_string());
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(root = %path.display(), error = %err, "skipping unreadable entry");
                }
            }
        }
    }

    debug!(count = found.len(), "resolved inputs");
    found.into_iter().map(PathBuf::from).collect()
}
