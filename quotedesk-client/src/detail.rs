use crate::error::{ClientError, Result};
use crate::integrations::{TicketApi, UploadRequest};
use crate::store::TicketStore;
use chrono::Utc;
use shared_types::{AttachmentFile, AttachmentKind, FileId, UpdateFileAmountRequest};
use std::sync::Arc;
use ticket_engine::{AttachmentReconciler, Observation};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

struct DetailState {
    open: bool,
    quotations: AttachmentReconciler,
    cpos: AttachmentReconciler,
}

impl DetailState {
    fn reconciler(&mut self, kind: AttachmentKind) -> &mut AttachmentReconciler {
        match kind {
            AttachmentKind::Quotation => &mut self.quotations,
            AttachmentKind::Cpo => &mut self.cpos,
        }
    }
}

/// One open ticket-detail view: the quotation and CPO sections with their
/// optimistic state.
///
/// Clones share the same session, so several uploads can run concurrently.
/// Responses that arrive after the session closed, or after another ticket was
/// selected in the store, are dropped without touching any state; the caller gets
/// `SessionClosed` or `StaleTarget` instead.
#[derive(Clone)]
pub struct TicketDetail {
    gmail_id: String,
    api: Arc<dyn TicketApi>,
    store: Arc<TicketStore>,
    state: Arc<Mutex<DetailState>>,
}

impl TicketDetail {
    /// Opens the detail view of a cached ticket and makes it the selected one
    pub async fn open(store: Arc<TicketStore>, gmail_id: &str) -> Result<Self> {
        let ticket = store
            .ticket(gmail_id)
            .await
            .ok_or_else(|| ClientError::TicketNotFound(gmail_id.to_string()))?;
        store.select(Some(gmail_id.to_string())).await;

        let mut quotations = AttachmentReconciler::new(gmail_id, AttachmentKind::Quotation);
        let mut cpos = AttachmentReconciler::new(gmail_id, AttachmentKind::Cpo);
        quotations.observe_ticket(&ticket);
        cpos.observe_ticket(&ticket);
        info!("Opened ticket {}", gmail_id);

        Ok(Self {
            gmail_id: gmail_id.to_string(),
            api: store.api(),
            store,
            state: Arc::new(Mutex::new(DetailState {
                open: true,
                quotations,
                cpos,
            })),
        })
    }

    pub fn gmail_id(&self) -> &str {
        &self.gmail_id
    }

    /// Offers the store's current copy of the ticket to both sections.
    /// Returns whether either attachment list changed.
    pub async fn sync(&self) -> bool {
        let Some(ticket) = self.store.ticket(&self.gmail_id).await else {
            return false;
        };
        let mut state = self.state.lock().await;
        if !state.open {
            return false;
        }
        let quotations = state.quotations.observe_ticket(&ticket);
        let cpos = state.cpos.observe_ticket(&ticket);
        quotations == Observation::Applied || cpos == Observation::Applied
    }

    pub async fn visible(&self, kind: AttachmentKind) -> Vec<AttachmentFile> {
        self.state.lock().await.reconciler(kind).visible()
    }

    pub async fn pending_ids(&self, kind: AttachmentKind) -> Vec<FileId> {
        self.state.lock().await.reconciler(kind).pending_ids()
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.open
    }

    /// Uploads one file. A placeholder is shown until the backend answers; it is then
    /// swapped for the returned record, or removed if the upload failed.
    pub async fn upload(
        &self,
        kind: AttachmentKind,
        file_name: &str,
        content: Vec<u8>,
        po_number: Option<String>,
    ) -> Result<AttachmentFile> {
        let temp_id = {
            let mut state = self.state.lock().await;
            if !state.open {
                return Err(ClientError::SessionClosed(self.gmail_id.clone()));
            }
            state
                .reconciler(kind)
                .begin_upload(file_name, po_number.clone(), Utc::now())
        };
        debug!("Uploading {} as {} ({})", file_name, kind.label(), temp_id);

        let result = self
            .api
            .upload_attachment(
                kind,
                UploadRequest {
                    gmail_id: self.gmail_id.clone(),
                    file_name: file_name.to_string(),
                    content,
                    po_number,
                },
            )
            .await;

        let mut state = match self.live_state().await {
            Ok(state) => state,
            Err(stale) => {
                debug!("Discarding upload response for {} on {}: {}", file_name, self.gmail_id, stale);
                return Err(stale);
            }
        };
        let reconciler = state.reconciler(kind);
        match result {
            Ok(file) => {
                reconciler.complete_upload(&temp_id, file.clone())?;
                info!("Uploaded {} to ticket {}", file.display_name(), self.gmail_id);
                self.publish(state, kind).await;
                Ok(file)
            }
            Err(e) => {
                reconciler.fail_upload(&temp_id)?;
                warn!("Upload of {} to ticket {} failed: {}", file_name, self.gmail_id, e);
                self.publish(state, kind).await;
                Err(e)
            }
        }
    }

    /// Deletes a file, hiding it at once. A failed request brings the file back.
    pub async fn delete(&self, kind: AttachmentKind, key: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.open {
                return Err(ClientError::SessionClosed(self.gmail_id.clone()));
            }
            state.reconciler(kind).begin_delete(key)?
        };

        let result = match snapshot.file.id.clone() {
            Some(file_id) => self.api.delete_attachment(kind, &file_id).await,
            None => Err(ticket_engine::ReconcileError::UnknownFile(key.to_string()).into()),
        };

        let mut state = match self.live_state().await {
            Ok(state) => state,
            Err(stale) => {
                debug!("Discarding delete response for {} on {}: {}", key, self.gmail_id, stale);
                return Err(stale);
            }
        };
        let reconciler = state.reconciler(kind);
        match result {
            Ok(()) => {
                reconciler.finish_delete(&snapshot);
                info!("Deleted {} from ticket {}", snapshot.file.display_name(), self.gmail_id);
                self.publish(state, kind).await;
                Ok(())
            }
            Err(e) => {
                reconciler.restore_delete(&snapshot);
                warn!("Delete of {} on ticket {} failed: {}", key, self.gmail_id, e);
                self.publish(state, kind).await;
                Err(e)
            }
        }
    }

    /// Changes the amount of a quotation file. The new amount stays on screen even if
    /// the backend rejects it; the next refresh brings back the stored value.
    /// Returns `Ok(false)` when the amount was unchanged and nothing was sent.
    pub async fn edit_amount(&self, key: &str, amount: &str) -> Result<bool> {
        {
            let mut state = self.state.lock().await;
            if !state.open {
                return Err(ClientError::SessionClosed(self.gmail_id.clone()));
            }
            if !state.quotations.patch_amount(key, amount)? {
                return Ok(false);
            }
            self.publish(state, AttachmentKind::Quotation).await;
        }

        let request = UpdateFileAmountRequest {
            gmail_id: self.gmail_id.clone(),
            file_id: FileId::from(key),
            amount: amount.trim().to_string(),
        };
        if let Err(e) = self.api.update_file_amount(&request).await {
            warn!("Amount update for {} on ticket {} failed: {}", key, self.gmail_id, e);
            return Err(e);
        }
        Ok(true)
    }

    /// Ends the session. Outstanding requests still complete, but their results are ignored.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.open = false;
        state.quotations.reset();
        state.cpos.reset();
        drop(state);

        self.store.deselect(&self.gmail_id).await;
        info!("Closed ticket {}", self.gmail_id);
    }

    /// The session state, unless the session closed or another ticket took over
    async fn live_state(&self) -> Result<MutexGuard<'_, DetailState>> {
        let state = self.state.lock().await;
        if !state.open {
            return Err(ClientError::SessionClosed(self.gmail_id.clone()));
        }
        if !self.store.is_selected(&self.gmail_id).await {
            return Err(ClientError::StaleTarget(self.gmail_id.clone()));
        }
        Ok(state)
    }

    /// Pushes the acknowledged files of one section into the store's cached ticket
    async fn publish(&self, mut state: MutexGuard<'_, DetailState>, kind: AttachmentKind) {
        let files = state.reconciler(kind).confirmed_files();
        drop(state);
        self.store
            .replace_attachments(&self.gmail_id, kind, files)
            .await;
    }
}
