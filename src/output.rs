use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Overwrite `path` with `content`, creating the file if needed.
///
/// The previous contents are fully replaced; readers see either the old line
/// or the new one, never an append. Directories are refused up front rather
/// than left to the OS error.
pub fn write_track_file(path: &Path, content: &str) -> Result<()> {
    if path.is_dir() {
        bail!("output target {} is a directory", path.display());
    }
    fs::write(path, content)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}
