//! Quotation desk client: ticket cache, ticket-detail sessions and the REST backend.

pub mod config;
pub mod detail;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod integrations;
pub mod jobs;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ClientConfig;
pub use detail::TicketDetail;
pub use error::{ClientError, Result};
pub use integrations::{HttpTicketApi, TicketApi, UploadRequest};
pub use jobs::TicketPoller;
pub use store::{RequestTag, TicketStore};
