//! Filesystem helpers.

use std::{fs, io, path::Path};

use crate::debug;

/// Recursively copy a directory tree.
///
/// Creates `dst` (and parents) as needed. Symlinks are followed, including
/// links to directories; dangling links are skipped. Special files are
/// skipped.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let target = dst.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_dir_all(&path, &target)?;
        } else if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => copy_dir_all(&path, &target)?,
                Ok(_) => {
                    fs::copy(&path, &target)?;
                }
                Err(e) => debug!("build"; "skipping symlink {}: {e}", path.display()),
            }
        } else if file_type.is_file() {
            fs::copy(&path, &target)?;
        }
    }
    Ok(())
}
