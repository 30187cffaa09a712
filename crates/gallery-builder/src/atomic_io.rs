//! Atomic replacement of the generated page.
//!
//! The page is written to a hidden sibling file first and renamed over the
//! target, so a browser refreshing mid-build never sees half a document.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::error::BuildError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `contents` to `file_name` inside `dir` via temp file and rename.
///
/// `file_name` must be a single normal path component.
///
/// # Errors
///
/// Returns [`BuildError::WriteError`] if any step fails; the temporary file
/// is removed on a best-effort basis.
pub(crate) fn write_atomic(dir: &Dir, file_name: &Utf8Path, contents: &str) -> Result<(), BuildError> {
    let mut components = file_name.components();
    let (Some(Utf8Component::Normal(name)), None) = (components.next(), components.next()) else {
        return Err(BuildError::WriteError {
            path: file_name.to_path_buf(),
            message: "output path must name a file".to_owned(),
        });
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{name}.tmp.{}.{counter}", std::process::id());

    let written = write_temp(dir, &tmp_name, contents).and_then(|()| dir.rename(&tmp_name, dir, name));
    if let Err(err) = written {
        if dir.remove_file(&tmp_name).is_err() {
            // Nothing left to clean up.
        }
        return Err(BuildError::WriteError {
            path: file_name.to_path_buf(),
            message: err.to_string(),
        });
    }

    if dir.open(".").and_then(|parent| parent.sync_all()).is_err() {
        // Directory sync is advisory.
    }
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;
    use tempfile::TempDir;

    fn open(tmp: &TempDir) -> Dir {
        Dir::open_ambient_dir(tmp.path(), ambient_authority()).expect("open temp dir")
    }

    #[test]
    fn replaces_existing_file() {
        let tmp = TempDir::new().expect("temp dir");
        let dir = open(&tmp);
        dir.write("index.html", "old").expect("seed file");

        write_atomic(&dir, Utf8Path::new("index.html"), "new").expect("write succeeds");

        assert_eq!(dir.read_to_string("index.html").expect("read back"), "new");
        let leftovers = dir
            .entries()
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn rejects_nested_paths() {
        let tmp = TempDir::new().expect("temp dir");
        let dir = open(&tmp);

        let result = write_atomic(&dir, Utf8Path::new("out/index.html"), "x");

        assert!(matches!(result, Err(BuildError::WriteError { .. })));
    }
}
