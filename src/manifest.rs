//! CSV manifest output
//!
//! One manifest per item type, written during the single-threaded collection
//! phase: a fixed header row, then one row per discovered record. Rows are
//! written before any download is attempted, so the manifest indexes what the
//! run discovered, not what it managed to fetch.

use crate::error::Result;
use crate::types::{ItemType, LinkedRecord};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Writer for one item type's manifest file
pub struct ManifestWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    share_type: String,
    visibility: String,
}

impl ManifestWriter {
    /// Create (or overwrite) the manifest for `item` under `output_dir`,
    /// creating the directory if absent, and write the header row.
    ///
    /// `share_type` and `visibility` are echoed into every note row; they are
    /// ignored for attachments.
    pub fn create(
        output_dir: &Path,
        item: ItemType,
        share_type: impl Into<String>,
        visibility: impl Into<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(item.manifest_filename());
        let mut writer = csv::Writer::from_writer(File::create(&path)?);
        writer.write_record(item.manifest_header())?;
        Ok(Self {
            writer,
            path,
            share_type: share_type.into(),
            visibility: visibility.into(),
        })
    }

    /// Path of the manifest file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record's row.
    ///
    /// The filename columns (`VersionData`/`PathOnClient` for attachments,
    /// `Content` for notes) carry the record's sanitized output filename.
    pub fn append(&mut self, record: &LinkedRecord) -> Result<()> {
        let filename = record.filename();
        match record {
            LinkedRecord::Attachment(a) => {
                self.writer.write_record([
                    a.parent_id.as_str(),
                    a.id.as_str(),
                    filename.as_str(),
                    filename.as_str(),
                    a.name.as_str(),
                    a.owner_id.as_str(),
                    a.created_date.as_str(),
                    a.created_by_id.as_str(),
                    a.last_modified_date.as_str(),
                ])?;
            }
            LinkedRecord::Note(n) => {
                self.writer.write_record([
                    n.parent_id.as_str(),
                    n.id.as_str(),
                    n.title.as_str(),
                    n.owner_id.as_str(),
                    filename.as_str(),
                    n.created_date.as_str(),
                    n.created_by_id.as_str(),
                    n.last_modified_date.as_str(),
                    self.share_type.as_str(),
                    self.visibility.as_str(),
                ])?;
            }
        }
        Ok(())
    }

    /// Flush buffered rows to disk
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
