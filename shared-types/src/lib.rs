pub mod analytics;
pub mod api;
pub mod attachment;
pub mod filter;
pub mod ticket;

pub use analytics::{EmployeeAnalyticsResponse, Funnel, Kpis, Workload};
pub use api::{
    DateRangeQuery, ErrorResponse, ListTicketsQuery, ListTicketsResponse, SuccessResponse,
    UpdateFileAmountRequest, UpdatePriorityRequest, UpdateStatusRequest,
    UploadAttachmentResponse,
};
pub use attachment::{
    AttachmentFile, AttachmentKind, FileId, AUTO_EXTRACTING, PENDING_URL, TEMP_ID_PREFIX,
};
pub use filter::{DateField, FilterState, Presence, StatusLabel, Urgency, INITIAL_FILTERS};
pub use ticket::{
    ActivityLog, EmailAddress, ExtractionResult, InternalNote, Requirement, Scalar, Ticket,
    TicketPriority, TicketStatus,
};
