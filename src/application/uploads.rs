use crate::domain::UploadedFileEntry;

/// Preview of the files picked for upload. Nothing is uploaded and no
/// size or type limit applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    entries: Vec<UploadedFileEntry>,
}

impl FileList {
    /// A new selection replaces the previous one entirely.
    pub fn replace(&mut self, entries: Vec<UploadedFileEntry>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[UploadedFileEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, human readable size)` for each entry, in selection order.
    pub fn rows(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.display_size()))
            .collect()
    }
}
