use shared_types::{AttachmentFile, FileId};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    InFlight,
    /// The server accepted the file but the polled ticket does not list it yet
    Confirmed(AttachmentFile),
}

/// One user-initiated upload, tracked by its temporary id
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    pub temp_id: FileId,
    pub placeholder: AttachmentFile,
    pub state: UploadState,
}

impl PendingUpload {
    /// What the attachment list shows for this upload right now
    pub fn visible_file(&self) -> &AttachmentFile {
        match &self.state {
            UploadState::InFlight => &self.placeholder,
            UploadState::Confirmed(file) => file,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, UploadState::InFlight)
    }
}

/// Arena of uploads started in one ticket-detail session, newest first.
///
/// Every change goes through one of the transitions below; entries leave the arena
/// when their upload fails or once the server's attachment list includes the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingUploads {
    entries: Vec<PendingUpload>,
    last_temp_millis: i64,
}

impl PendingUploads {
    /// Allocates a `temp-<millis>` id, bumping past the previous one when two
    /// uploads start within the same millisecond.
    pub fn allocate_id(&mut self, now_millis: i64) -> FileId {
        let millis = now_millis.max(self.last_temp_millis + 1);
        self.last_temp_millis = millis;
        FileId::temporary(millis)
    }

    /// Registers an upload whose placeholder already carries its temporary id
    pub fn start(&mut self, placeholder: AttachmentFile) -> Option<FileId> {
        let temp_id = placeholder.id.clone()?;
        if self.get(&temp_id).is_some() {
            return None;
        }
        self.entries.insert(
            0,
            PendingUpload {
                temp_id: temp_id.clone(),
                placeholder,
                state: UploadState::InFlight,
            },
        );
        Some(temp_id)
    }

    /// Marks an in-flight upload as accepted, keeping its position
    pub fn confirm(&mut self, temp_id: &FileId, file: AttachmentFile) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| &entry.temp_id == temp_id && entry.is_in_flight())
        {
            Some(entry) => {
                entry.state = UploadState::Confirmed(file);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, temp_id: &FileId) -> Option<PendingUpload> {
        let index = self.entries.iter().position(|e| &e.temp_id == temp_id)?;
        Some(self.entries.remove(index))
    }

    /// Drops confirmed uploads the server now lists itself
    pub fn settle(&mut self, server_keys: &HashSet<String>) {
        self.entries.retain(|entry| match &entry.state {
            UploadState::InFlight => true,
            UploadState::Confirmed(file) => !file.key().is_some_and(|k| server_keys.contains(k)),
        });
    }

    /// Drops a confirmed upload after the file was deleted
    pub fn forget_confirmed(&mut self, key: &str) {
        self.entries.retain(|entry| match &entry.state {
            UploadState::InFlight => true,
            UploadState::Confirmed(file) => file.key() != Some(key),
        });
    }

    pub fn get(&self, temp_id: &FileId) -> Option<&PendingUpload> {
        self.entries.iter().find(|e| &e.temp_id == temp_id)
    }

    pub fn confirmed_mut(&mut self, key: &str) -> Option<&mut AttachmentFile> {
        self.entries.iter_mut().find_map(|entry| match &mut entry.state {
            UploadState::Confirmed(file) if file.key() == Some(key) => Some(file),
            _ => None,
        })
    }

    pub fn in_flight_ids(&self) -> Vec<FileId> {
        self.entries
            .iter()
            .filter(|e| e.is_in_flight())
            .map(|e| e.temp_id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingUpload> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(id: FileId) -> AttachmentFile {
        AttachmentFile {
            id: Some(id),
            name: Some("quote.pdf".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_allocate_id_is_monotonic() {
        let mut uploads = PendingUploads::default();
        let a = uploads.allocate_id(1_700_000_000_000);
        let b = uploads.allocate_id(1_700_000_000_000);
        let c = uploads.allocate_id(1_699_999_999_000);

        assert_eq!(a.as_str(), "temp-1700000000000");
        assert_eq!(b.as_str(), "temp-1700000000001");
        assert_eq!(c.as_str(), "temp-1700000000002");
    }

    #[test]
    fn test_start_rejects_duplicates_and_keyless() {
        let mut uploads = PendingUploads::default();
        let id = uploads.allocate_id(10);
        assert!(uploads.start(placeholder(id.clone())).is_some());
        assert!(uploads.start(placeholder(id)).is_none());
        assert!(uploads.start(AttachmentFile::default()).is_none());
        assert_eq!(uploads.len(), 1);
    }

    #[test]
    fn test_settle_keeps_in_flight() {
        let mut uploads = PendingUploads::default();
        let first = uploads.allocate_id(10);
        let second = uploads.allocate_id(20);
        uploads.start(placeholder(first.clone()));
        uploads.start(placeholder(second.clone()));

        let served = AttachmentFile {
            id: Some(FileId::from(501)),
            ..Default::default()
        };
        assert!(uploads.confirm(&first, served));
        assert_eq!(uploads.in_flight_ids(), vec![second.clone()]);

        let keys: HashSet<String> = ["501".to_string()].into_iter().collect();
        uploads.settle(&keys);
        assert_eq!(uploads.len(), 1);
        assert!(uploads.get(&second).is_some());
    }
}
