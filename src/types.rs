//! Core record types and the query-result boundary
//!
//! Query responses arrive as loosely-typed JSON rows. Everything downstream
//! works with the validated types in this module instead: a missing required
//! field fails here, at the boundary, not deep inside manifest writing or
//! download dispatch.

use crate::error::{Error, Result};
use crate::filename::build_filename;
use serde_json::Value;

/// The two kinds of record-linked content an export run can process
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ItemType {
    /// Legacy binary attachment; content fetched per record over HTTP
    Attachment,
    /// Legacy note; content is an inline text body in the query result
    Note,
}

impl ItemType {
    /// Lowercase label used in log lines
    pub fn label(self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Note => "note",
        }
    }

    /// The sObject this item type is queried from
    pub fn object_name(self) -> &'static str {
        match self {
            Self::Attachment => "Attachment",
            Self::Note => "Note",
        }
    }

    /// Manifest file name for this item type
    pub fn manifest_filename(self) -> &'static str {
        match self {
            Self::Attachment => "files.csv",
            Self::Note => "content_notes.csv",
        }
    }

    /// Manifest header columns, in write order
    pub fn manifest_header(self) -> &'static [&'static str] {
        match self {
            Self::Attachment => &[
                "FirstPublishLocationId",
                "AttachmentId",
                "VersionData",
                "PathOnClient",
                "Title",
                "OwnerId",
                "CreatedDate",
                "CreatedById",
                "LastModifiedDate",
            ],
            Self::Note => &[
                "LinkedEntityId",
                "LegacyNoteId",
                "Title",
                "OwnerId",
                "Content",
                "CreatedDate",
                "CreatedById",
                "LastModifiedDate",
                "ShareType",
                "Visibility",
            ],
        }
    }

    /// Discovery query: narrow field set, restricted to the parent filter.
    ///
    /// `parent_filter` is the caller-supplied SOQL predicate yielding parent
    /// record ids; it is interpolated into a `ParentId IN (...)` clause.
    pub fn discovery_soql(self, parent_filter: &str) -> String {
        match self {
            Self::Attachment => format!(
                "SELECT Id, ContentType, Description, Name, OwnerId, ParentId, CreatedById, \
                 CreatedDate, LastModifiedDate FROM Attachment WHERE ParentId IN ({parent_filter})"
            ),
            Self::Note => format!(
                "SELECT Id, Title, OwnerId, ParentId, CreatedById, CreatedDate, \
                 LastModifiedDate FROM Note WHERE ParentId IN ({parent_filter})"
            ),
        }
    }

    /// Batch-detail query stem: the field set a download needs, without a
    /// WHERE clause. The dispatcher appends `WHERE Id IN (...)` per batch.
    pub fn detail_soql(self) -> &'static str {
        match self {
            Self::Attachment => {
                "SELECT Id, ContentType, Description, Name, OwnerId, ParentId FROM Attachment"
            }
            Self::Note => "SELECT Id, Body, Title, OwnerId, ParentId FROM Note",
        }
    }
}

/// An attachment as returned by the discovery query
///
/// Date fields are carried verbatim as the remote store formatted them; the
/// manifest echoes them without parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentRecord {
    /// Record id
    pub id: String,
    /// File name as stored in the org
    pub name: String,
    /// Owning user id
    pub owner_id: String,
    /// Parent business record id
    pub parent_id: String,
    /// Creation timestamp, verbatim
    pub created_date: String,
    /// Creating user id
    pub created_by_id: String,
    /// Last modification timestamp, verbatim
    pub last_modified_date: String,
}

/// A note as returned by the discovery or detail query
#[derive(Clone, Debug, PartialEq)]
pub struct NoteRecord {
    /// Record id
    pub id: String,
    /// Note title
    pub title: String,
    /// Owning user id
    pub owner_id: String,
    /// Parent business record id
    pub parent_id: String,
    /// Creation timestamp, verbatim
    pub created_date: String,
    /// Creating user id
    pub created_by_id: String,
    /// Last modification timestamp, verbatim
    pub last_modified_date: String,
    /// Inline text body; absent in discovery results and for empty notes
    pub body: Option<String>,
}

/// Tagged union over the discovery-query record shapes
#[derive(Clone, Debug, PartialEq)]
pub enum LinkedRecord {
    /// A binary attachment
    Attachment(AttachmentRecord),
    /// A free-text note
    Note(NoteRecord),
}

impl LinkedRecord {
    /// Validate a discovery-query row into a typed record.
    ///
    /// The discovery field set includes everything the manifest needs, so all
    /// fields except the note body are required here.
    pub fn from_row(item: ItemType, row: &Value) -> Result<Self> {
        match item {
            ItemType::Attachment => Ok(Self::Attachment(AttachmentRecord {
                id: str_field(row, item, "Id")?,
                name: str_field(row, item, "Name")?,
                owner_id: str_field(row, item, "OwnerId")?,
                parent_id: str_field(row, item, "ParentId")?,
                created_date: str_field(row, item, "CreatedDate")?,
                created_by_id: str_field(row, item, "CreatedById")?,
                last_modified_date: str_field(row, item, "LastModifiedDate")?,
            })),
            ItemType::Note => Ok(Self::Note(NoteRecord {
                id: str_field(row, item, "Id")?,
                title: str_field(row, item, "Title")?,
                owner_id: str_field(row, item, "OwnerId")?,
                parent_id: str_field(row, item, "ParentId")?,
                created_date: str_field(row, item, "CreatedDate")?,
                created_by_id: str_field(row, item, "CreatedById")?,
                last_modified_date: str_field(row, item, "LastModifiedDate")?,
                body: opt_str_field(row, "Body"),
            })),
        }
    }

    /// Record id
    pub fn id(&self) -> &str {
        match self {
            Self::Attachment(a) => &a.id,
            Self::Note(n) => &n.id,
        }
    }

    /// Parent business record id
    pub fn parent_id(&self) -> &str {
        match self {
            Self::Attachment(a) => &a.parent_id,
            Self::Note(n) => &n.parent_id,
        }
    }

    /// Title text the filename derives from (attachment name or note title)
    pub fn title(&self) -> &str {
        match self {
            Self::Attachment(a) => &a.name,
            Self::Note(n) => &n.title,
        }
    }

    /// Sanitized output filename for this record
    pub fn filename(&self) -> String {
        build_filename(self.title(), self.id(), self.parent_id())
    }
}

/// A record as returned by the batch-detail query: just what a download needs
///
/// The detail field set is deliberately not the discovery field set (it adds
/// the note body and drops the audit dates), so detail rows get their own
/// validated shape instead of a half-filled [`LinkedRecord`].
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadRecord {
    /// Record id
    pub id: String,
    /// Title text the filename derives from
    pub title: String,
    /// Parent business record id
    pub parent_id: String,
    /// Inline note body; always `None` for attachments
    pub body: Option<String>,
}

impl DownloadRecord {
    /// Validate a batch-detail row into a download work item
    pub fn from_row(item: ItemType, row: &Value) -> Result<Self> {
        let title_field = match item {
            ItemType::Attachment => "Name",
            ItemType::Note => "Title",
        };
        Ok(Self {
            id: str_field(row, item, "Id")?,
            title: str_field(row, item, title_field)?,
            parent_id: str_field(row, item, "ParentId")?,
            body: match item {
                ItemType::Attachment => None,
                ItemType::Note => opt_str_field(row, "Body"),
            },
        })
    }

    /// Sanitized output filename for this record
    pub fn filename(&self) -> String {
        build_filename(&self.title, &self.id, &self.parent_id)
    }
}

/// Extract a required string field from a query row
fn str_field(row: &Value, item: ItemType, field: &'static str) -> Result<String> {
    row.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(Error::MissingField {
            object: item.object_name(),
            field,
        })
}

/// Extract an optional string field; JSON `null` and absence both map to `None`
fn opt_str_field(row: &Value, field: &str) -> Option<String> {
    row.get(field).and_then(Value::as_str).map(str::to_string)
}
