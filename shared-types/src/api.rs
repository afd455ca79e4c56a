use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attachment::{AttachmentFile, FileId};
use crate::ticket::{Ticket, TicketPriority, TicketStatus};

/// Query string of `GET /emails`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListTicketsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Response for the ticket list
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListTicketsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Ticket>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the quotation / CPO upload endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UploadAttachmentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub file: Option<AttachmentFile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Bare acknowledgement returned by delete and update endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateFileAmountRequest {
    pub gmail_id: String,
    pub file_id: FileId,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateStatusRequest {
    pub ticket_number: String,
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdatePriorityRequest {
    pub ticket_number: String,
    pub priority: TicketPriority,
}

/// Query string of the employee analytics endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).or(self.detail)
    }
}
