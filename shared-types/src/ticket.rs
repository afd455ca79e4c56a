use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::attachment::AttachmentFile;

/// A customer inquiry derived from an inbound email.
///
/// Tickets are owned by the backend and cached on the client. `gmail_id` is the
/// correlation key for everything the client does with a ticket; array position
/// and the numeric `id` are not stable enough for reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ticket {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub gmail_id: String,
    #[serde(default)]
    pub ticket_number: Option<String>,

    // Pipeline
    #[serde(default)]
    pub ticket_status: Option<String>,
    #[serde(default)]
    pub ticket_priority: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,

    // Email
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,

    // Timestamps, kept in their raw wire form (naive-local or ISO 8601)
    #[serde(default)]
    pub received_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,

    // Extraction
    #[serde(default)]
    pub extraction_status: Option<String>,
    #[serde(default)]
    pub extraction_result: Option<ExtractionResult>,
    #[serde(default)]
    pub quotation_amount: Option<Scalar>,

    // Attachments and history
    #[serde(default, deserialize_with = "null_as_default")]
    pub quotation_files: Vec<AttachmentFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpo_files: Vec<AttachmentFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activity_logs: Vec<ActivityLog>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub internal_notes: Vec<InternalNote>,
}

/// Structured data the backend extracted from the email body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExtractionResult {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<Scalar>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(rename = "Requirements", default, deserialize_with = "null_as_default")]
    pub requirements: Vec<Requirement>,
}

/// One requested line item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Requirement {
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Quantity", default)]
    pub quantity: Option<Scalar>,
    #[serde(rename = "Unit", default)]
    pub unit: Option<String>,
    #[serde(rename = "Unit price", default)]
    pub unit_price: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActivityLog {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Internal notes arrive either as bare strings or as objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum InternalNote {
    Text(String),
    Entry {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        created_at: Option<String>,
    },
}

/// A loosely typed value the backend sends as either a number or a string
/// (amounts, quantities, phone numbers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value, parsing text like `"1,250.50"` or `"$ 300"`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if n.is_finite() => Some(*n),
            Scalar::Number(_) => None,
            Scalar::Text(s) => s
                .replace([',', '$'], "")
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral numbers print without a trailing ".0", the way the front-end renders them
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

/// Backend status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    Inbox,
    Sent,
    OrderConfirmed,
    OrderCompleted,
    CompletionRequested,
    ClosureRequested,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 8] = [
        TicketStatus::Open,
        TicketStatus::Inbox,
        TicketStatus::Sent,
        TicketStatus::OrderConfirmed,
        TicketStatus::OrderCompleted,
        TicketStatus::CompletionRequested,
        TicketStatus::ClosureRequested,
        TicketStatus::Closed,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::Inbox => "INBOX",
            TicketStatus::Sent => "SENT",
            TicketStatus::OrderConfirmed => "ORDER_CONFIRMED",
            TicketStatus::OrderCompleted => "ORDER_COMPLETED",
            TicketStatus::CompletionRequested => "COMPLETION_REQUESTED",
            TicketStatus::ClosureRequested => "CLOSURE_REQUESTED",
            TicketStatus::Closed => "CLOSED",
        }
    }

    /// Case-insensitive lookup; accepts spaces or dashes in place of underscores
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|s| s.code() == normalized)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Normal,
    Urgent,
}

impl TicketPriority {
    pub fn code(&self) -> &'static str {
        match self {
            TicketPriority::Normal => "NORMAL",
            TicketPriority::Urgent => "URGENT",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "NORMAL" => Some(TicketPriority::Normal),
            "URGENT" => Some(TicketPriority::Urgent),
            _ => None,
        }
    }
}

/// Parsed form of a `"Name <email>"` sender header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmailAddress {
    pub email: String,
    pub name: Option<String>,
}

/// Treats an explicit JSON `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_sparse_ticket() {
        let ticket: Ticket = serde_json::from_str(
            r#"{"id": 7, "gmail_id": "abc", "quotation_files": null, "internal_notes": ["call back", {"content": "sent samples"}]}"#,
        )
        .unwrap();

        assert_eq!(ticket.id, 7);
        assert!(ticket.quotation_files.is_empty());
        assert!(ticket.ticket_status.is_none());
        assert_eq!(ticket.internal_notes.len(), 2);
        assert!(matches!(&ticket.internal_notes[0], InternalNote::Text(t) if t == "call back"));
    }

    #[test]
    fn test_requirements_use_wire_names() {
        let result: ExtractionResult = serde_json::from_str(
            r#"{"Requirements": [{"Description": "Steel pipe", "Quantity": 12, "Unit": "m", "Unit price": "45.5"}]}"#,
        )
        .unwrap();

        let item = &result.requirements[0];
        assert_eq!(item.description.as_deref(), Some("Steel pipe"));
        assert_eq!(item.quantity, Some(Scalar::Number(12.0)));
        assert_eq!(item.unit_price.as_ref().and_then(Scalar::as_f64), Some(45.5));
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Number(1500.0).to_string(), "1500");
        assert_eq!(Scalar::Number(12.75).to_string(), "12.75");
        assert_eq!(Scalar::from("Auto-Extracting...").to_string(), "Auto-Extracting...");
        assert_eq!(Scalar::from("1,250.50").as_f64(), Some(1250.5));
        assert_eq!(Scalar::from("pending").as_f64(), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TicketStatus::from_code("order confirmed"), Some(TicketStatus::OrderConfirmed));
        assert_eq!(TicketStatus::from_code("closed"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::from_code("archived"), None);
        assert_eq!(
            serde_json::to_string(&TicketStatus::ClosureRequested).unwrap(),
            "\"CLOSURE_REQUESTED\""
        );
    }
}
