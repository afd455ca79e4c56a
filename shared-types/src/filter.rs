use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use ts_rs::TS;

/// Status buckets offered by the ticket monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StatusLabel {
    Inbox,
    Sent,
    #[serde(rename = "Order Confirmed")]
    OrderConfirmed,
    #[serde(rename = "Order Completed")]
    OrderCompleted,
    Closed,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 5] = [
        StatusLabel::Inbox,
        StatusLabel::Sent,
        StatusLabel::OrderConfirmed,
        StatusLabel::OrderCompleted,
        StatusLabel::Closed,
    ];

    /// Backend status codes that fall into this bucket
    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            StatusLabel::Inbox => &["OPEN", "INBOX"],
            StatusLabel::Sent => &["SENT"],
            StatusLabel::OrderConfirmed => &["ORDER_CONFIRMED"],
            StatusLabel::OrderCompleted => &["ORDER_COMPLETED"],
            StatusLabel::Closed => &["CLOSED"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusLabel::Inbox => "Inbox",
            StatusLabel::Sent => "Sent",
            StatusLabel::OrderConfirmed => "Order Confirmed",
            StatusLabel::OrderCompleted => "Order Completed",
            StatusLabel::Closed => "Closed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(&wanted))
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency criterion: `ALL` or a priority value compared case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Urgency {
    #[default]
    All,
    Level(String),
}

impl From<String> for Urgency {
    fn from(value: String) -> Self {
        if value.trim().is_empty() || value.trim().eq_ignore_ascii_case("ALL") {
            Urgency::All
        } else {
            Urgency::Level(value.trim().to_string())
        }
    }
}

impl From<Urgency> for String {
    fn from(value: Urgency) -> Self {
        match value {
            Urgency::All => "ALL".to_string(),
            Urgency::Level(level) => level,
        }
    }
}

/// Which timestamp the date range is tested against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    /// `received_at`, falling back to `created_at`
    #[default]
    Received,
    Updated,
}

/// Tri-state toggle for "has attachments of this kind"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Any,
    With,
    Without,
}

/// Snapshot of every predicate narrowing the ticket list.
/// Empty strings, empty sets and `None` bounds mean "not configured".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct FilterState {
    pub statuses: BTreeSet<StatusLabel>,
    #[ts(type = "string")]
    pub urgency: Urgency,
    pub date_type: DateField,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub client_email: String,
    pub assignee_name: String,
    pub ticket_number: String,
    pub quotation_reference: String,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub has_cpo: Presence,
    pub has_quotation: Presence,
}

/// The all-permissive filter every monitor starts with
pub const INITIAL_FILTERS: FilterState = FilterState {
    statuses: BTreeSet::new(),
    urgency: Urgency::All,
    date_type: DateField::Received,
    start_date: None,
    end_date: None,
    client_email: String::new(),
    assignee_name: String::new(),
    ticket_number: String::new(),
    quotation_reference: String::new(),
    min_amount: None,
    max_amount: None,
    has_cpo: Presence::Any,
    has_quotation: Presence::Any,
};

impl Default for FilterState {
    fn default() -> Self {
        INITIAL_FILTERS
    }
}
