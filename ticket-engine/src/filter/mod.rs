mod panel;

pub use panel::FilterPanel;

use shared_types::{DateField, FilterState, Presence, Ticket, Urgency, INITIAL_FILTERS};

use crate::search::search_matches;
use crate::timestamp::{day_bounds, parse_local};

/// Extraction status that makes a ticket visible in the monitor
pub const VALID_EXTRACTION: &str = "VALID";

const DEFAULT_STATUS: &str = "OPEN";
const DEFAULT_PRIORITY: &str = "NON_URGENT";

/// Tickets shown by the monitor: the VALID baseline, then the user's search and filters
pub fn monitor_view<'a>(tickets: &'a [Ticket], filters: &FilterState, query: &str) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|ticket| is_monitor_eligible(ticket))
        .filter(|ticket| ticket_passes(ticket, filters, query))
        .collect()
}

/// Ordered subsequence of `tickets` satisfying every configured criterion.
/// Unconfigured criteria always pass, so `INITIAL_FILTERS` with an empty query keeps everything.
pub fn filter_tickets<'a>(tickets: &'a [Ticket], filters: &FilterState, query: &str) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|ticket| ticket_passes(ticket, filters, query))
        .collect()
}

pub fn is_monitor_eligible(ticket: &Ticket) -> bool {
    ticket.extraction_status.as_deref() == Some(VALID_EXTRACTION)
}

fn ticket_passes(ticket: &Ticket, filters: &FilterState, query: &str) -> bool {
    search_matches(ticket, query) && matches_filters(ticket, filters)
}

/// Structured criteria only; free-text search is applied by the callers above
pub fn matches_filters(ticket: &Ticket, filters: &FilterState) -> bool {
    matches_status(ticket, filters)
        && matches_urgency(ticket, &filters.urgency)
        && contains_ci(ticket.sender.as_deref(), &filters.client_email)
        && contains_ci(ticket.assigned_to.as_deref(), &filters.assignee_name)
        && contains_ci(Some(&ticket.id.to_string()), &filters.ticket_number)
        && matches_quotation_reference(ticket, &filters.quotation_reference)
        && matches_date_range(ticket, filters)
        && matches_amount(ticket, filters)
        && matches_presence(ticket.quotation_files.len(), filters.has_quotation)
        && matches_presence(ticket.cpo_files.len(), filters.has_cpo)
}

/// Uppercased `ticket_status`, `OPEN` when unset
pub fn effective_status(ticket: &Ticket) -> String {
    non_blank(ticket.ticket_status.as_deref())
        .map(str::to_uppercase)
        .unwrap_or_else(|| DEFAULT_STATUS.to_string())
}

fn matches_status(ticket: &Ticket, filters: &FilterState) -> bool {
    if filters.statuses.is_empty() {
        return true;
    }
    let status = effective_status(ticket);
    filters
        .statuses
        .iter()
        .flat_map(|label| label.codes())
        .any(|code| *code == status)
}

fn matches_urgency(ticket: &Ticket, urgency: &Urgency) -> bool {
    match urgency {
        Urgency::All => true,
        Urgency::Level(level) => non_blank(ticket.ticket_priority.as_deref())
            .unwrap_or(DEFAULT_PRIORITY)
            .eq_ignore_ascii_case(level.trim()),
    }
}

fn matches_quotation_reference(ticket: &Ticket, reference: &str) -> bool {
    if reference.trim().is_empty() {
        return true;
    }
    ticket
        .quotation_files
        .iter()
        .any(|file| contains_ci(file.reference_id.as_deref(), reference))
}

/// Timestamp the date range is tested against
pub fn filter_timestamp(ticket: &Ticket, date_type: DateField) -> Option<&str> {
    match date_type {
        DateField::Updated => ticket.updated_at.as_deref(),
        DateField::Received => non_blank(ticket.received_at.as_deref())
            .or_else(|| non_blank(ticket.created_at.as_deref())),
    }
}

fn matches_date_range(ticket: &Ticket, filters: &FilterState) -> bool {
    if filters.start_date.is_none() && filters.end_date.is_none() {
        return true;
    }
    // Tickets lacking a usable timestamp cannot be excluded
    let Some(at) = filter_timestamp(ticket, filters.date_type).and_then(parse_local) else {
        return true;
    };

    let after_start = filters
        .start_date
        .map_or(true, |date| at >= day_bounds(date).0);
    let before_end = filters
        .end_date
        .map_or(true, |date| at <= day_bounds(date).1);
    after_start && before_end
}

/// Quoted amount of a ticket: `quotation_amount` when numeric, else the sum of the
/// parsable quotation file amounts.
pub fn ticket_amount(ticket: &Ticket) -> Option<f64> {
    if let Some(amount) = ticket.quotation_amount.as_ref().and_then(|a| a.as_f64()) {
        return Some(amount);
    }
    let amounts: Vec<f64> = ticket
        .quotation_files
        .iter()
        .filter_map(|file| file.amount.as_ref().and_then(|a| a.as_f64()))
        .collect();
    if amounts.is_empty() {
        None
    } else {
        Some(amounts.iter().sum())
    }
}

fn matches_amount(ticket: &Ticket, filters: &FilterState) -> bool {
    if filters.min_amount.is_none() && filters.max_amount.is_none() {
        return true;
    }
    let Some(amount) = ticket_amount(ticket) else {
        return true;
    };
    filters.min_amount.map_or(true, |min| amount >= min)
        && filters.max_amount.map_or(true, |max| amount <= max)
}

fn matches_presence(count: usize, presence: Presence) -> bool {
    match presence {
        Presence::Any => true,
        Presence::With => count > 0,
        Presence::Without => count == 0,
    }
}

/// Number of configured criteria, for the filter button badge
pub fn active_filter_count(filters: &FilterState) -> usize {
    let initial = &INITIAL_FILTERS;
    [
        !filters.statuses.is_empty(),
        filters.urgency != initial.urgency,
        filters.start_date.is_some() || filters.end_date.is_some(),
        !filters.client_email.trim().is_empty(),
        !filters.assignee_name.trim().is_empty(),
        !filters.ticket_number.trim().is_empty(),
        !filters.quotation_reference.trim().is_empty(),
        filters.min_amount.is_some() || filters.max_amount.is_some(),
        filters.has_cpo != initial.has_cpo,
        filters.has_quotation != initial.has_quotation,
    ]
    .into_iter()
    .filter(|active| *active)
    .count()
}

/// Case-insensitive substring test; a blank needle always passes, a missing haystack never does
fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    if needle.trim().is_empty() {
        return true;
    }
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared_types::{AttachmentFile, Scalar, StatusLabel};

    fn ticket(id: i64, status: Option<&str>) -> Ticket {
        Ticket {
            id,
            gmail_id: format!("gmail-{id}"),
            ticket_status: status.map(str::to_string),
            extraction_status: Some(VALID_EXTRACTION.to_string()),
            ..Default::default()
        }
    }

    fn ids(tickets: &[&Ticket]) -> Vec<i64> {
        tickets.iter().map(|t| t.id).collect()
    }

    fn june_15() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 6, 15)
    }

    #[test]
    fn test_initial_filters_keep_everything() {
        let tickets = vec![ticket(1, None), ticket(2, Some("SENT")), ticket(3, Some("CLOSED"))];
        assert_eq!(ids(&filter_tickets(&tickets, &INITIAL_FILTERS, "")), vec![1, 2, 3]);
    }

    #[test]
    fn test_monitor_view_applies_valid_baseline() {
        let mut pending = ticket(2, None);
        pending.extraction_status = Some("PROCESSING".to_string());
        let mut missing = ticket(3, None);
        missing.extraction_status = None;
        let tickets = vec![ticket(1, None), pending, missing, ticket(4, Some("SENT"))];

        assert_eq!(ids(&monitor_view(&tickets, &INITIAL_FILTERS, "")), vec![1, 4]);
    }

    #[test]
    fn test_missing_status_counts_as_inbox() {
        let tickets = vec![ticket(1, None), ticket(2, Some("inbox")), ticket(3, Some("SENT"))];
        let filters = FilterState {
            statuses: [StatusLabel::Inbox].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &filters, "")), vec![1, 2]);
    }

    #[test]
    fn test_status_union() {
        let tickets = vec![
            ticket(1, Some("SENT")),
            ticket(2, Some("ORDER_CONFIRMED")),
            ticket(3, Some("CLOSURE_REQUESTED")),
            ticket(4, Some("closed")),
        ];
        let filters = FilterState {
            statuses: [StatusLabel::OrderConfirmed, StatusLabel::Closed].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &filters, "")), vec![2, 4]);
    }

    #[test]
    fn test_urgency_defaults_to_non_urgent() {
        let mut urgent = ticket(1, None);
        urgent.ticket_priority = Some("Urgent".to_string());
        let tickets = vec![urgent, ticket(2, None)];

        let filters = FilterState {
            urgency: Urgency::Level("URGENT".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &filters, "")), vec![1]);

        let filters = FilterState {
            urgency: Urgency::Level("non_urgent".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &filters, "")), vec![2]);
    }

    #[test]
    fn test_text_criteria() {
        let mut a = ticket(120, None);
        a.sender = Some("Priya <priya@acme.com>".to_string());
        a.assigned_to = Some("Ravi Kumar".to_string());
        a.quotation_files.push(AttachmentFile {
            reference_id: Some("QT-2024-118".to_string()),
            ..Default::default()
        });
        let b = ticket(7, None);
        let tickets = vec![a, b];

        let by_client = FilterState {
            client_email: "ACME.com".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &by_client, "")), vec![120]);

        let by_assignee = FilterState {
            assignee_name: "ravi".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &by_assignee, "")), vec![120]);

        let by_number = FilterState {
            ticket_number: "7".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &by_number, "")), vec![7]);

        let by_reference = FilterState {
            quotation_reference: "qt-2024".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &by_reference, "")), vec![120]);

        let padded = FilterState {
            assignee_name: " ravi".to_string(),
            ..Default::default()
        };
        assert!(filter_tickets(&tickets, &padded, "").is_empty());
    }

    #[test]
    fn test_date_range_day_boundaries() {
        let mut last_second = ticket(1, None);
        last_second.received_at = Some("2024-06-15T23:59:59".to_string());
        let mut next_day = ticket(2, None);
        next_day.received_at = Some("2024-06-16T00:00:01".to_string());
        let mut first_second = ticket(3, None);
        first_second.received_at = Some("2024-06-15 00:00:00".to_string());
        let tickets = vec![last_second, next_day, first_second];

        let filters = FilterState {
            start_date: june_15(),
            end_date: june_15(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &filters, "")), vec![1, 3]);
    }

    #[test]
    fn test_date_range_field_selection_and_missing_timestamps() {
        let mut created_only = ticket(1, None);
        created_only.created_at = Some("2024-06-10T09:00:00".to_string());
        created_only.updated_at = Some("2024-06-10T09:00:00".to_string());
        let mut updated = ticket(2, None);
        updated.received_at = Some("2024-06-01T09:00:00".to_string());
        updated.updated_at = Some("2024-06-15T12:00:00".to_string());
        let undated = ticket(3, None);
        let tickets = vec![created_only, updated, undated];

        let received = FilterState {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 5),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &received, "")), vec![1, 3]);

        let by_update = FilterState {
            date_type: DateField::Updated,
            start_date: june_15(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &by_update, "")), vec![2, 3]);
    }

    #[test]
    fn test_blank_received_at_falls_back_to_created_at() {
        let mut blank = ticket(1, None);
        blank.received_at = Some("  ".to_string());
        blank.created_at = Some("2024-06-01T09:00:00".to_string());
        assert_eq!(
            filter_timestamp(&blank, DateField::Received),
            Some("2024-06-01T09:00:00")
        );

        let filters = FilterState {
            start_date: june_15(),
            ..Default::default()
        };
        assert!(filter_tickets(&[blank], &filters, "").is_empty());
    }

    #[test]
    fn test_amount_bounds_and_presence() {
        let mut quoted = ticket(1, None);
        quoted.quotation_amount = Some(Scalar::from("12,500"));
        let mut by_files = ticket(2, None);
        by_files.quotation_files = vec![
            AttachmentFile {
                amount: Some(Scalar::Number(300.0)),
                ..Default::default()
            },
            AttachmentFile {
                amount: Some(Scalar::from("Auto-Extracting...")),
                ..Default::default()
            },
        ];
        let mut with_cpo = ticket(3, None);
        with_cpo.cpo_files.push(AttachmentFile::default());
        let tickets = vec![quoted, by_files, with_cpo];

        let min_1000 = FilterState {
            min_amount: Some(1000.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &min_1000, "")), vec![1, 3]);

        let with_quotation = FilterState {
            has_quotation: Presence::With,
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &with_quotation, "")), vec![2]);

        let without_cpo = FilterState {
            has_cpo: Presence::Without,
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &without_cpo, "")), vec![1, 2]);
    }

    #[test]
    fn test_search_runs_with_filters() {
        let mut a = ticket(1, Some("SENT"));
        a.subject = Some("Valve quotation".to_string());
        let mut b = ticket(2, None);
        b.subject = Some("Valve inquiry".to_string());
        let tickets = vec![a, b];

        let filters = FilterState {
            statuses: [StatusLabel::Inbox].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tickets(&tickets, &filters, "valve")), vec![2]);
        assert!(filter_tickets(&tickets, &filters, "pump").is_empty());
    }

    #[test]
    fn test_active_filter_count() {
        assert_eq!(active_filter_count(&INITIAL_FILTERS), 0);
        let filters = FilterState {
            statuses: [StatusLabel::Sent].into_iter().collect(),
            end_date: june_15(),
            has_cpo: Presence::With,
            ..Default::default()
        };
        assert_eq!(active_filter_count(&filters), 3);
    }
}
