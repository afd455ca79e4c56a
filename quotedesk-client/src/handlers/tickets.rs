use crate::config::ClientConfig;
use crate::jobs::TicketPoller;
use crate::store::{RequestTag, TicketStore};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use shared_types::{DateField, Presence, StatusLabel, Ticket, TicketPriority, TicketStatus, Urgency};
use std::sync::Arc;
use ticket_engine::timestamp::format_local_with;
use ticket_engine::{active_filter_count, effective_status, sender_label, FilterPanel};

use super::{parse_presence, parse_priority, parse_status_label, parse_ticket_status};

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Free-text search across every ticket field
    #[arg(long, short)]
    pub search: Option<String>,
    /// Status bucket, repeatable: Inbox, Sent, "Order Confirmed", "Order Completed", Closed
    #[arg(long = "status", value_parser = parse_status_label)]
    pub statuses: Vec<StatusLabel>,
    /// Priority to match, e.g. URGENT
    #[arg(long)]
    pub urgency: Option<String>,
    #[arg(long = "from")]
    pub start_date: Option<NaiveDate>,
    #[arg(long = "to")]
    pub end_date: Option<NaiveDate>,
    /// Test the date range against updated_at instead of received_at
    #[arg(long)]
    pub by_updated: bool,
    /// Substring of the sender
    #[arg(long)]
    pub client: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub number: Option<String>,
    /// Substring of any quotation reference id
    #[arg(long)]
    pub reference: Option<String>,
    #[arg(long)]
    pub min_amount: Option<f64>,
    #[arg(long)]
    pub max_amount: Option<f64>,
    /// any, with or without quotation files
    #[arg(long, value_parser = parse_presence)]
    pub quotation: Option<Presence>,
    /// any, with or without CPO files
    #[arg(long, value_parser = parse_presence)]
    pub cpo: Option<Presence>,
}

impl FilterArgs {
    /// Edits the panel's draft from the flags and applies it
    pub fn apply_to(&self, panel: &mut FilterPanel) -> bool {
        let draft = panel.begin_edit();
        if !self.statuses.is_empty() {
            draft.statuses = self.statuses.iter().copied().collect();
        }
        if let Some(urgency) = &self.urgency {
            draft.urgency = Urgency::from(urgency.clone());
        }
        if self.by_updated {
            draft.date_type = DateField::Updated;
        }
        draft.start_date = self.start_date.or(draft.start_date);
        draft.end_date = self.end_date.or(draft.end_date);
        for (value, field) in [
            (&self.client, &mut draft.client_email),
            (&self.assignee, &mut draft.assignee_name),
            (&self.number, &mut draft.ticket_number),
            (&self.reference, &mut draft.quotation_reference),
        ] {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        draft.min_amount = self.min_amount.or(draft.min_amount);
        draft.max_amount = self.max_amount.or(draft.max_amount);
        draft.has_quotation = self.quotation.unwrap_or(draft.has_quotation);
        draft.has_cpo = self.cpo.unwrap_or(draft.has_cpo);
        panel.apply()
    }

    pub fn query(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }
}

#[derive(Args, Debug, Clone)]
pub struct TicketsArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Include tickets whose extraction is not VALID
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SetStatusArgs {
    pub gmail_id: String,
    #[arg(value_parser = parse_ticket_status)]
    pub status: TicketStatus,
}

#[derive(Args, Debug, Clone)]
pub struct SetPriorityArgs {
    pub gmail_id: String,
    #[arg(value_parser = parse_priority)]
    pub priority: TicketPriority,
}

pub async fn list(store: &TicketStore, config: &ClientConfig, args: &TicketsArgs) -> Result<()> {
    store
        .refetch(RequestTag::Foreground)
        .await
        .context("Failed to load tickets")?;

    let mut panel = FilterPanel::new();
    args.filters.apply_to(&mut panel);
    let tickets = if args.all {
        store.filtered(panel.applied(), args.filters.query()).await
    } else {
        store.monitor(panel.applied(), args.filters.query()).await
    };

    println!(
        "{} tickets ({} filters active)",
        tickets.len(),
        active_filter_count(panel.applied())
    );
    for ticket in &tickets {
        println!("{}", render_row(ticket, &config.display.timestamp_format));
    }
    Ok(())
}

/// Polls until Ctrl+C, printing the monitor's per-status counts after every interval
pub async fn watch(store: Arc<TicketStore>, config: &ClientConfig, args: &FilterArgs) -> Result<()> {
    let mut panel = FilterPanel::new();
    args.apply_to(&mut panel);

    let mut poller = TicketPoller::new(Arc::clone(&store), config.polling.interval());
    poller.start();

    let mut interval = tokio::time::interval(config.polling.interval());
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                }
                tracing::info!("Ctrl+C received, shutting down...");
                break;
            }
            _ = interval.tick() => {
                let tickets = store.monitor(panel.applied(), args.query()).await;
                println!("{}", render_counts(&tickets));
                if let Some(error) = store.last_error().await {
                    println!("  last refresh failed: {}", error);
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

pub async fn set_status(store: &TicketStore, args: &SetStatusArgs) -> Result<()> {
    store.refetch(RequestTag::Foreground).await?;
    store
        .update_status(&args.gmail_id, args.status)
        .await
        .with_context(|| format!("Failed to update status of {}", args.gmail_id))?;
    println!("{} -> {}", args.gmail_id, args.status);
    Ok(())
}

pub async fn set_priority(store: &TicketStore, args: &SetPriorityArgs) -> Result<()> {
    store.refetch(RequestTag::Foreground).await?;
    store
        .update_priority(&args.gmail_id, args.priority)
        .await
        .with_context(|| format!("Failed to update priority of {}", args.gmail_id))?;
    println!("{} -> {}", args.gmail_id, args.priority.code());
    Ok(())
}

fn render_row(ticket: &Ticket, timestamp_format: &str) -> String {
    let received = ticket.received_at.as_deref().or(ticket.created_at.as_deref());
    format!(
        "{:<14} {:<20} {:<10} {:<12} {:<32} {}",
        ticket.ticket_number.as_deref().unwrap_or(&ticket.gmail_id),
        effective_status(ticket),
        ticket.ticket_priority.as_deref().unwrap_or("-"),
        format_local_with(received, timestamp_format),
        sender_label(ticket.sender.as_deref()),
        ticket.subject.as_deref().unwrap_or(""),
    )
}

/// One line with the number of tickets in each status bucket
fn render_counts(tickets: &[Ticket]) -> String {
    let counts: Vec<String> = StatusLabel::ALL
        .iter()
        .map(|label| {
            let count = tickets
                .iter()
                .filter(|t| label.codes().contains(&effective_status(t).as_str()))
                .count();
            format!("{}: {}", label, count)
        })
        .collect();
    format!("{} tickets | {}", tickets.len(), counts.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::INITIAL_FILTERS;

    #[test]
    fn test_filter_args_build_panel() {
        let args = FilterArgs {
            statuses: vec![StatusLabel::Sent, StatusLabel::Closed],
            urgency: Some("urgent".to_string()),
            by_updated: true,
            client: Some("acme".to_string()),
            min_amount: Some(100.0),
            cpo: Some(Presence::Without),
            ..Default::default()
        };
        let mut panel = FilterPanel::new();
        assert!(args.apply_to(&mut panel));

        let applied = panel.applied();
        assert_eq!(applied.statuses.len(), 2);
        assert_eq!(applied.urgency, Urgency::Level("urgent".to_string()));
        assert_eq!(applied.date_type, DateField::Updated);
        assert_eq!(applied.client_email, "acme");
        assert_eq!(applied.has_cpo, Presence::Without);
        assert_eq!(applied.has_quotation, Presence::Any);
        assert_eq!(active_filter_count(applied), 5);
    }

    #[test]
    fn test_no_flags_leave_initial_filters() {
        let mut panel = FilterPanel::new();
        assert!(!FilterArgs::default().apply_to(&mut panel));
        assert_eq!(panel.applied(), &INITIAL_FILTERS);
    }

    #[test]
    fn test_render_counts_buckets_open_as_inbox() {
        let with_status = |status: Option<&str>| Ticket {
            ticket_status: status.map(str::to_string),
            ..Default::default()
        };
        let open = with_status(None);
        let sent = with_status(Some("sent"));
        let requested = with_status(Some("CLOSURE_REQUESTED"));

        let line = render_counts(&[open, sent, requested]);
        assert!(line.starts_with("3 tickets | Inbox: 1 | Sent: 1 |"));
        assert!(line.ends_with("Closed: 0"));
    }

    #[test]
    fn test_render_row_falls_back() {
        let ticket = Ticket {
            gmail_id: "g1".to_string(),
            sender: Some("Priya Shah <priya@acme.test>".to_string()),
            created_at: Some("2024-06-15T09:05:00".to_string()),
            subject: Some("RFQ valves".to_string()),
            ..Default::default()
        };
        let row = render_row(&ticket, "%Y-%m-%d");
        assert!(row.starts_with("g1 "));
        assert!(row.contains("OPEN"));
        assert!(row.contains("2024-06-15"));
        assert!(row.ends_with("RFQ valves"));
    }
}
