use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::ticket::Scalar;

/// Prefix of client-assigned ids for uploads the server has not confirmed yet
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Amount shown while the backend extracts the real value from the document
pub const AUTO_EXTRACTING: &str = "Auto-Extracting...";

/// Placeholder url for files that have not been persisted
pub const PENDING_URL: &str = "#";

/// A quotation or customer purchase order (CPO) document attached to a ticket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttachmentFile {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub amount: Option<Scalar>,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

impl AttachmentFile {
    /// Stable identity of a file: `id`, then `url`, then `name`.
    /// The first non-empty candidate wins; `None` means the entry cannot be tracked.
    pub fn key(&self) -> Option<&str> {
        let id = self.id.as_ref().map(FileId::as_str);
        [id, self.url.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.trim().is_empty())
    }

    pub fn is_temporary(&self) -> bool {
        self.id.as_ref().is_some_and(FileId::is_temporary)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

/// Server-assigned file id. The backend sends integers for persisted files;
/// the client uses `temp-<millis>` strings for in-flight uploads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub struct FileId(pub String);

impl FileId {
    pub fn temporary(millis: i64) -> Self {
        FileId(format!("{TEMP_ID_PREFIX}{millis}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        FileId(value.to_string())
    }
}

impl From<i64> for FileId {
    fn from(value: i64) -> Self {
        FileId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => FileId(n.to_string()),
            RawId::Text(s) => FileId(s),
        })
    }
}

/// Which attachment list of a ticket a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum AttachmentKind {
    Quotation,
    Cpo,
}

impl AttachmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AttachmentKind::Quotation => "quotation",
            AttachmentKind::Cpo => "cpo",
        }
    }

    /// Only quotation amounts can be edited by hand
    pub fn amount_editable(&self) -> bool {
        matches!(self, AttachmentKind::Quotation)
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
