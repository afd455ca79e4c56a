pub mod http;

pub use http::HttpTicketApi;

use crate::error::Result;
use async_trait::async_trait;
use shared_types::{
    AttachmentFile, AttachmentKind, DateRangeQuery, EmployeeAnalyticsResponse, FileId,
    ListTicketsQuery, Ticket, UpdateFileAmountRequest, UpdatePriorityRequest,
    UpdateStatusRequest,
};

/// A file picked by the user, sent as one multipart upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub gmail_id: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub po_number: Option<String>,
}

/// REST surface of the quotation desk backend
#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn list_tickets(&self, query: &ListTicketsQuery) -> Result<Vec<Ticket>>;

    async fn upload_attachment(
        &self,
        kind: AttachmentKind,
        upload: UploadRequest,
    ) -> Result<AttachmentFile>;
    async fn delete_attachment(&self, kind: AttachmentKind, file_id: &FileId) -> Result<()>;
    async fn update_file_amount(&self, request: &UpdateFileAmountRequest) -> Result<()>;

    async fn update_status(&self, request: &UpdateStatusRequest) -> Result<()>;
    async fn update_priority(&self, request: &UpdatePriorityRequest) -> Result<()>;

    async fn employee_analytics(
        &self,
        employee_id: i64,
        range: &DateRangeQuery,
    ) -> Result<EmployeeAnalyticsResponse>;
}
