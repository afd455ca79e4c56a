use crate::integrations::TicketApi;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use shared_types::DateRangeQuery;
use ticket_engine::AnalyticsView;

#[derive(Args, Debug, Clone)]
pub struct AnalyticsArgs {
    pub employee_id: i64,
    #[arg(long = "from")]
    pub start_date: Option<NaiveDate>,
    #[arg(long = "to")]
    pub end_date: Option<NaiveDate>,
}

pub async fn show(api: &dyn TicketApi, args: &AnalyticsArgs) -> Result<()> {
    let range = DateRangeQuery {
        start_date: args.start_date,
        end_date: args.end_date,
    };
    let response = api
        .employee_analytics(args.employee_id, &range)
        .await
        .with_context(|| format!("Failed to load analytics for employee {}", args.employee_id))?;

    println!("{}", render(&AnalyticsView::from(response)));
    Ok(())
}

fn render(view: &AnalyticsView) -> String {
    let kpis = &view.kpis;
    let funnel = &view.funnel;
    let workload = &view.workload;
    let avg_response = kpis
        .avg_response_hours
        .map(|hours| format!("{:.1}h", hours))
        .unwrap_or_else(|| "-".to_string());

    [
        format!(
            "Tickets {}  Quotes sent {} ({})  Orders confirmed {}  Closed {}  Avg response {}",
            kpis.total_tickets,
            kpis.quotes_sent,
            view.sent_rate,
            kpis.orders_confirmed,
            kpis.closed_delivered,
            avg_response
        ),
        format!(
            "Funnel: received {} -> quoted {} -> confirmed {} -> closed {}  (conversion {})",
            funnel.received,
            funnel.quotes_sent,
            funnel.orders_confirmed,
            funnel.closed_delivered,
            view.conversion_rate
        ),
        format!(
            "Workload: open {}  urgent {}  awaiting order {}  awaiting closure {}",
            workload.open, workload.urgent, workload.awaiting_order, workload.awaiting_closure
        ),
    ]
    .join("\n")
}
