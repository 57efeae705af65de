use std::fs;
use std::io;
use std::path::Path;

use crate::domain::UploadedFileEntry;

/// Builds upload entries from files on disk.
pub struct FileProbe;

impl FileProbe {
    pub fn probe(path: &Path) -> io::Result<UploadedFileEntry> {
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(UploadedFileEntry::new(name, metadata.len()))
    }

    /// Probes a comma-separated list of paths. Blank items are skipped; the
    /// first unreadable path fails the whole selection.
    pub fn probe_list(paths: &str) -> io::Result<Vec<UploadedFileEntry>> {
        paths
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Self::probe(Path::new(p)))
            .collect()
    }
}
