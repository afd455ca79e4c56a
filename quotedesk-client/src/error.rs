use thiserror::Error;
use ticket_engine::ReconcileError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Ticket {0} not found")]
    TicketNotFound(String),

    #[error("Ticket {0} has no ticket number")]
    MissingTicketNumber(String),

    #[error("Ticket detail for {0} is closed")]
    SessionClosed(String),

    #[error("Ticket {0} is no longer the selected ticket")]
    StaleTarget(String),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
