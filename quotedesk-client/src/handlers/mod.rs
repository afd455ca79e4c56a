//! Command handlers behind the `quotedesk` binary. Each handler refreshes what it
//! needs through the store and prints plain text to stdout.

pub mod analytics;
pub mod attachments;
pub mod tickets;

use shared_types::{AttachmentKind, Presence, StatusLabel, TicketPriority, TicketStatus};

pub(crate) fn parse_status_label(value: &str) -> Result<StatusLabel, String> {
    StatusLabel::from_label(value).ok_or_else(|| {
        let known: Vec<&str> = StatusLabel::ALL.iter().map(StatusLabel::label).collect();
        format!("unknown status '{}', expected one of: {}", value, known.join(", "))
    })
}

pub(crate) fn parse_ticket_status(value: &str) -> Result<TicketStatus, String> {
    TicketStatus::from_code(value).ok_or_else(|| format!("unknown ticket status '{}'", value))
}

pub(crate) fn parse_priority(value: &str) -> Result<TicketPriority, String> {
    TicketPriority::from_code(value)
        .ok_or_else(|| format!("unknown priority '{}', expected NORMAL or URGENT", value))
}

pub(crate) fn parse_presence(value: &str) -> Result<Presence, String> {
    match value.trim().to_lowercase().as_str() {
        "any" => Ok(Presence::Any),
        "with" | "yes" => Ok(Presence::With),
        "without" | "no" => Ok(Presence::Without),
        _ => Err(format!("expected any, with or without, got '{}'", value)),
    }
}

pub(crate) fn parse_kind(value: &str) -> Result<AttachmentKind, String> {
    match value.trim().to_lowercase().as_str() {
        "quotation" | "quote" => Ok(AttachmentKind::Quotation),
        "cpo" | "po" => Ok(AttachmentKind::Cpo),
        _ => Err(format!("expected quotation or cpo, got '{}'", value)),
    }
}
