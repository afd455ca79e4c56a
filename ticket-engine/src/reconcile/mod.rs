//! Optimistic attachment list for one ticket.
//!
//! The visible list is always derived from three inputs:
//!
//! - `server`: the last attachment list the backend reported, deduplicated and newest first
//! - `uploads`: uploads started in this session (in flight, or confirmed but not yet polled)
//! - `deleting`: files hidden while their delete request is outstanding
//!
//! `visible()` = uploads (newest first) ++ server, minus anything being deleted.
//! Uploads always lead the list regardless of their timestamps.

mod pending;

pub use pending::{PendingUpload, PendingUploads, UploadState};

use chrono::{DateTime, Utc};
use shared_types::{
    AttachmentFile, AttachmentKind, FileId, Scalar, Ticket, AUTO_EXTRACTING, PENDING_URL,
};
use std::collections::{BTreeMap, HashSet};

use crate::timestamp::sort_key;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("No pending upload with id {0}")]
    UnknownUpload(FileId),

    #[error("No attachment with id {0}")]
    UnknownFile(String),

    #[error("Upload {0} has not been confirmed yet")]
    UploadInFlight(String),

    #[error("Delete already in progress for {0}")]
    DeleteInFlight(String),

    #[error("Amounts of {0} files cannot be edited")]
    AmountNotEditable(AttachmentKind),
}

/// What the reconciler last saw of its ticket. A refresh is only applied when
/// this changes; identity of the ticket object itself is never compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRevision {
    pub gmail_id: String,
    pub updated_at: Option<String>,
    pub file_keys: Vec<String>,
}

impl TicketRevision {
    pub fn of(ticket: &Ticket, kind: AttachmentKind) -> Self {
        Self {
            gmail_id: ticket.gmail_id.clone(),
            updated_at: ticket.updated_at.clone(),
            file_keys: attachments_of(ticket, kind)
                .iter()
                .filter_map(|f| f.key().map(str::to_string))
                .collect(),
        }
    }
}

/// Result of offering a polled ticket to the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Applied,
    Unchanged,
    /// The ticket is not the one this reconciler belongs to
    OtherTicket,
}

/// Handle returned by `begin_delete`, needed to settle or roll back the delete
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSnapshot {
    pub key: String,
    pub file: AttachmentFile,
}

#[derive(Debug, Clone)]
pub struct AttachmentReconciler {
    gmail_id: String,
    kind: AttachmentKind,
    revision: Option<TicketRevision>,
    server: Vec<AttachmentFile>,
    uploads: PendingUploads,
    deleting: BTreeMap<String, AttachmentFile>,
}

pub fn attachments_of(ticket: &Ticket, kind: AttachmentKind) -> &[AttachmentFile] {
    match kind {
        AttachmentKind::Quotation => &ticket.quotation_files,
        AttachmentKind::Cpo => &ticket.cpo_files,
    }
}

/// Deduplicates by `AttachmentFile::key` (first occurrence wins, keyless entries are
/// dropped) and sorts by `uploaded_at`, newest first. The sort is stable.
pub fn normalize_server_files(files: &[AttachmentFile]) -> Vec<AttachmentFile> {
    let mut seen = HashSet::new();
    let mut unique: Vec<AttachmentFile> = files
        .iter()
        .filter(|file| file.key().is_some_and(|key| seen.insert(key.to_string())))
        .cloned()
        .collect();
    unique.sort_by(|a, b| {
        sort_key(b.uploaded_at.as_deref()).cmp(&sort_key(a.uploaded_at.as_deref()))
    });
    unique
}

impl AttachmentReconciler {
    pub fn new(gmail_id: impl Into<String>, kind: AttachmentKind) -> Self {
        Self {
            gmail_id: gmail_id.into(),
            kind,
            revision: None,
            server: Vec::new(),
            uploads: PendingUploads::default(),
            deleting: BTreeMap::new(),
        }
    }

    pub fn for_ticket(ticket: &Ticket, kind: AttachmentKind) -> Self {
        let mut reconciler = Self::new(ticket.gmail_id.clone(), kind);
        reconciler.observe_ticket(ticket);
        reconciler
    }

    pub fn gmail_id(&self) -> &str {
        &self.gmail_id
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// Feeds a freshly polled copy of the ticket. Copies of other tickets are ignored,
    /// as are copies whose revision matches what was already applied.
    pub fn observe_ticket(&mut self, ticket: &Ticket) -> Observation {
        if ticket.gmail_id != self.gmail_id {
            return Observation::OtherTicket;
        }
        let revision = TicketRevision::of(ticket, self.kind);
        if self.revision.as_ref() == Some(&revision) {
            return Observation::Unchanged;
        }
        self.apply_server_files(attachments_of(ticket, self.kind));
        self.revision = Some(revision);
        Observation::Applied
    }

    /// Replaces the server side of the merge. Pending uploads keep their place in front;
    /// confirmed uploads the server now lists are handed over to the server copy.
    pub fn apply_server_files(&mut self, files: &[AttachmentFile]) {
        self.server = normalize_server_files(files);
        let keys: HashSet<String> = self
            .server
            .iter()
            .filter_map(|f| f.key().map(str::to_string))
            .collect();
        self.uploads.settle(&keys);
    }

    /// Adds a placeholder for an upload that is about to be sent and returns its temporary id
    pub fn begin_upload(
        &mut self,
        name: &str,
        po_number: Option<String>,
        now: DateTime<Utc>,
    ) -> FileId {
        let temp_id = self.uploads.allocate_id(now.timestamp_millis());
        let placeholder = AttachmentFile {
            id: Some(temp_id.clone()),
            name: Some(name.to_string()),
            url: Some(PENDING_URL.to_string()),
            amount: Some(Scalar::from(AUTO_EXTRACTING)),
            reference_id: None,
            po_number: match self.kind {
                AttachmentKind::Cpo => po_number,
                AttachmentKind::Quotation => None,
            },
            uploaded_at: Some(now.to_rfc3339()),
        };
        // allocate_id never repeats, so the placeholder is always accepted
        let _ = self.uploads.start(placeholder);
        temp_id
    }

    /// Swaps the placeholder for the record the server returned, in place
    pub fn complete_upload(
        &mut self,
        temp_id: &FileId,
        file: AttachmentFile,
    ) -> Result<(), ReconcileError> {
        if !self.is_in_flight(temp_id) {
            return Err(ReconcileError::UnknownUpload(temp_id.clone()));
        }

        let already_served = file
            .key()
            .is_some_and(|key| self.server.iter().any(|f| f.key() == Some(key)));
        if already_served {
            // A poll beat the upload response; the server copy is authoritative
            self.uploads.remove(temp_id);
        } else {
            self.uploads.confirm(temp_id, file);
        }
        Ok(())
    }

    /// Removes the placeholder of a failed upload
    pub fn fail_upload(&mut self, temp_id: &FileId) -> Result<PendingUpload, ReconcileError> {
        if !self.is_in_flight(temp_id) {
            return Err(ReconcileError::UnknownUpload(temp_id.clone()));
        }
        self.uploads
            .remove(temp_id)
            .ok_or_else(|| ReconcileError::UnknownUpload(temp_id.clone()))
    }

    /// Hides a file ahead of its delete request
    pub fn begin_delete(&mut self, key: &str) -> Result<DeleteSnapshot, ReconcileError> {
        if self.deleting.contains_key(key) {
            return Err(ReconcileError::DeleteInFlight(key.to_string()));
        }
        if self.is_in_flight(&FileId::from(key)) {
            return Err(ReconcileError::UploadInFlight(key.to_string()));
        }
        let file = self
            .visible()
            .into_iter()
            .find(|f| f.key() == Some(key))
            .ok_or_else(|| ReconcileError::UnknownFile(key.to_string()))?;

        self.deleting.insert(key.to_string(), file.clone());
        Ok(DeleteSnapshot {
            key: key.to_string(),
            file,
        })
    }

    /// The server confirmed the delete
    pub fn finish_delete(&mut self, snapshot: &DeleteSnapshot) {
        self.deleting.remove(&snapshot.key);
        self.server.retain(|f| f.key() != Some(snapshot.key.as_str()));
        self.uploads.forget_confirmed(&snapshot.key);
    }

    /// Puts a file back after its delete request failed.
    /// If a refresh dropped the file in the meantime, the snapshot copy is restored.
    pub fn restore_delete(&mut self, snapshot: &DeleteSnapshot) {
        self.deleting.remove(&snapshot.key);
        let still_listed = self.visible().iter().any(|f| f.key() == Some(snapshot.key.as_str()));
        if !still_listed {
            let mut files = self.server.clone();
            files.push(snapshot.file.clone());
            self.server = normalize_server_files(&files);
        }
    }

    /// Patches the displayed amount of a quotation file.
    /// Returns `Ok(false)` when the amount did not change. There is no rollback:
    /// a failed update stays visible until the next refresh replaces it.
    pub fn patch_amount(&mut self, key: &str, amount: &str) -> Result<bool, ReconcileError> {
        if !self.kind.amount_editable() {
            return Err(ReconcileError::AmountNotEditable(self.kind));
        }
        if self.is_in_flight(&FileId::from(key)) {
            return Err(ReconcileError::UploadInFlight(key.to_string()));
        }

        let file = match self.uploads.confirmed_mut(key) {
            Some(file) => file,
            None => self
                .server
                .iter_mut()
                .find(|f| f.key() == Some(key))
                .ok_or_else(|| ReconcileError::UnknownFile(key.to_string()))?,
        };

        let amount = amount.trim();
        let current = file.amount.as_ref().map(Scalar::to_string).unwrap_or_default();
        if current == amount {
            return Ok(false);
        }
        file.amount = if amount.is_empty() {
            None
        } else {
            Some(Scalar::from(amount))
        };
        Ok(true)
    }

    /// The list to render: uploads first, then server files, minus pending deletes
    pub fn visible(&self) -> Vec<AttachmentFile> {
        self.merged()
            .filter(|f| !f.key().is_some_and(|k| self.deleting.contains_key(k)))
            .cloned()
            .collect()
    }

    /// Files the server has acknowledged, for keeping the cached ticket in step.
    /// Files awaiting a delete response are still listed: they are not gone until
    /// the server says so.
    pub fn confirmed_files(&self) -> Vec<AttachmentFile> {
        let in_flight: HashSet<FileId> = self.uploads.in_flight_ids().into_iter().collect();
        self.merged()
            .filter(|f| !f.id.as_ref().is_some_and(|id| in_flight.contains(id)))
            .cloned()
            .collect()
    }

    // Uploads ++ server files, with confirmed uploads shadowing their server copy
    fn merged(&self) -> impl Iterator<Item = &AttachmentFile> + '_ {
        let confirmed_keys: HashSet<&str> = self
            .uploads
            .iter()
            .filter(|entry| !entry.is_in_flight())
            .filter_map(|entry| entry.visible_file().key())
            .collect();

        self.uploads.iter().map(PendingUpload::visible_file).chain(
            self.server
                .iter()
                .filter(move |f| !f.key().is_some_and(|k| confirmed_keys.contains(k))),
        )
    }

    fn is_in_flight(&self, temp_id: &FileId) -> bool {
        self.uploads
            .get(temp_id)
            .is_some_and(PendingUpload::is_in_flight)
    }

    pub fn pending_ids(&self) -> Vec<FileId> {
        self.uploads.in_flight_ids()
    }

    pub fn has_pending(&self) -> bool {
        self.uploads.iter().any(PendingUpload::is_in_flight)
    }

    /// Forgets session-local state when the detail view goes away
    pub fn reset(&mut self) {
        self.uploads.clear();
        self.deleting.clear();
        self.revision = None;
    }
}
