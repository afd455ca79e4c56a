use shared_types::{EmployeeAnalyticsResponse, Funnel, Kpis, Ticket, Workload};

/// `(ordersConfirmed + closedDelivered) / quotesSent` as a one-decimal percentage.
/// No quotes sent yields `"0%"`.
pub fn conversion_rate(funnel: &Funnel) -> String {
    if funnel.quotes_sent == 0 {
        return "0%".to_string();
    }
    let converted = funnel.orders_confirmed.saturating_add(funnel.closed_delivered) as f64;
    format!("{:.1}%", converted / funnel.quotes_sent as f64 * 100.0)
}

/// Employee analytics as displayed: server aggregates plus the client-derived ratio
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsView {
    pub kpis: Kpis,
    pub funnel: Funnel,
    pub workload: Workload,
    pub sent_rate: String,
    pub conversion_rate: String,
    pub tickets: Vec<Ticket>,
}

impl From<EmployeeAnalyticsResponse> for AnalyticsView {
    fn from(response: EmployeeAnalyticsResponse) -> Self {
        let sent_rate = response
            .kpis
            .sent_rate
            .as_ref()
            .map(|rate| rate.to_string())
            .unwrap_or_else(|| "0%".to_string());
        let conversion_rate = conversion_rate(&response.funnel);

        Self {
            kpis: response.kpis,
            funnel: response.funnel,
            workload: response.workload,
            sent_rate,
            conversion_rate,
            tickets: response.tickets,
        }
    }
}
