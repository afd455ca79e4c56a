use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ticket::{Scalar, Ticket};

/// Per-employee KPI counters computed by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Kpis {
    pub total_tickets: u64,
    pub quotes_sent: u64,
    /// Server formatted, e.g. `"72.5%"`; displayed as given
    pub sent_rate: Option<Scalar>,
    pub orders_confirmed: u64,
    pub closed_delivered: u64,
    pub avg_response_hours: Option<f64>,
}

/// Quotation pipeline counts for the selected date range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Funnel {
    pub received: u64,
    pub quotes_sent: u64,
    pub orders_confirmed: u64,
    pub closed_delivered: u64,
}

/// Tickets currently sitting with the employee
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Workload {
    pub open: u64,
    pub urgent: u64,
    pub awaiting_order: u64,
    pub awaiting_closure: u64,
}

/// Response of `GET /admin/employee-analytics/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct EmployeeAnalyticsResponse {
    pub success: bool,
    pub kpis: Kpis,
    pub funnel: Funnel,
    pub workload: Workload,
    pub tickets: Vec<Ticket>,
}
