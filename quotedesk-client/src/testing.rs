use crate::error::{ClientError, Result};
use crate::integrations::{TicketApi, UploadRequest};
use async_trait::async_trait;
use shared_types::{
    AttachmentFile, AttachmentKind, DateRangeQuery, EmployeeAnalyticsResponse, FileId,
    ListTicketsQuery, Ticket, UpdateFileAmountRequest, UpdatePriorityRequest,
    UpdateStatusRequest,
};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

pub fn ticket(gmail_id: &str) -> Ticket {
    Ticket {
        id: 1,
        gmail_id: gmail_id.to_string(),
        ticket_number: Some(format!("TKT-{}", gmail_id)),
        extraction_status: Some("VALID".to_string()),
        ..Default::default()
    }
}

pub fn server_file(id: i64, name: &str) -> AttachmentFile {
    AttachmentFile {
        id: Some(FileId::from(id)),
        name: Some(name.to_string()),
        url: Some(format!("/files/{}", name)),
        ..Default::default()
    }
}

/// In-memory backend recording every call it receives.
///
/// Holding `gate` blocks uploads and deletes until it is released, which lets tests
/// act while a request is outstanding.
#[derive(Default)]
pub struct FakeApi {
    tickets: Mutex<Vec<Ticket>>,
    calls: Mutex<Vec<String>>,
    fail_list: AtomicBool,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    fail_amounts: AtomicBool,
    last_file_id: AtomicI64,
    pub gate: tokio::sync::Mutex<()>,
}

impl FakeApi {
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let api = Self::default();
        api.last_file_id.store(500, Ordering::SeqCst);
        api.set_tickets(tickets);
        api
    }

    pub fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.lock().unwrap() = tickets;
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_amounts(&self, fail: bool) {
        self.fail_amounts.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| *c == "list").count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn outcome(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(ClientError::Backend {
                status: 500,
                message: format!("{} failed", what),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TicketApi for FakeApi {
    async fn list_tickets(&self, _query: &ListTicketsQuery) -> Result<Vec<Ticket>> {
        self.record("list".to_string());
        Self::outcome(&self.fail_list, "list")?;
        Ok(self.tickets.lock().unwrap().clone())
    }

    async fn upload_attachment(
        &self,
        kind: AttachmentKind,
        upload: UploadRequest,
    ) -> Result<AttachmentFile> {
        let _gate = self.gate.lock().await;
        self.record(format!("upload {} {}", kind.label(), upload.file_name));
        Self::outcome(&self.fail_uploads, "upload")?;
        let id = self.last_file_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut file = server_file(id, &upload.file_name);
        file.po_number = upload.po_number;
        Ok(file)
    }

    async fn delete_attachment(&self, kind: AttachmentKind, file_id: &FileId) -> Result<()> {
        let _gate = self.gate.lock().await;
        self.record(format!("delete {} {}", kind.label(), file_id));
        Self::outcome(&self.fail_deletes, "delete")
    }

    async fn update_file_amount(&self, request: &UpdateFileAmountRequest) -> Result<()> {
        self.record(format!("amount {} {}", request.file_id, request.amount));
        Self::outcome(&self.fail_amounts, "amount update")
    }

    async fn update_status(&self, request: &UpdateStatusRequest) -> Result<()> {
        self.record(format!("status {} {}", request.ticket_number, request.status));
        Ok(())
    }

    async fn update_priority(&self, request: &UpdatePriorityRequest) -> Result<()> {
        self.record(format!(
            "priority {} {}",
            request.ticket_number,
            request.priority.code()
        ));
        Ok(())
    }

    async fn employee_analytics(
        &self,
        employee_id: i64,
        _range: &DateRangeQuery,
    ) -> Result<EmployeeAnalyticsResponse> {
        self.record(format!("analytics {}", employee_id));
        Ok(EmployeeAnalyticsResponse {
            success: true,
            ..Default::default()
        })
    }
}
