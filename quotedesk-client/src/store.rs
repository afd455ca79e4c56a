use crate::error::{ClientError, Result};
use crate::integrations::TicketApi;
use chrono::{DateTime, Utc};
use shared_types::{
    AttachmentFile, AttachmentKind, FilterState, ListTicketsQuery, Ticket, TicketPriority,
    TicketStatus, UpdatePriorityRequest, UpdateStatusRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Who asked for a refresh. Background polls never drive the loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTag {
    Foreground,
    Background,
}

#[derive(Debug, Default)]
struct StoreState {
    tickets: Vec<Ticket>,
    refreshed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    selected: Option<String>,
}

/// Client-side cache of the ticket list.
///
/// Manual refreshes and scheduled polls may overlap; whichever response resolves
/// last replaces the cached list.
pub struct TicketStore {
    api: Arc<dyn TicketApi>,
    query: ListTicketsQuery,
    state: RwLock<StoreState>,
    foreground_in_flight: AtomicUsize,
}

struct ForegroundGuard<'a>(&'a AtomicUsize);

impl<'a> ForegroundGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ForegroundGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TicketStore {
    pub fn new(api: Arc<dyn TicketApi>, query: ListTicketsQuery) -> Self {
        Self {
            api,
            query,
            state: RwLock::new(StoreState::default()),
            foreground_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn api(&self) -> Arc<dyn TicketApi> {
        Arc::clone(&self.api)
    }

    /// Fetches the ticket list and replaces the cache. Returns the number of tickets.
    pub async fn refetch(&self, tag: RequestTag) -> Result<usize> {
        let _guard = match tag {
            RequestTag::Foreground => Some(ForegroundGuard::enter(&self.foreground_in_flight)),
            RequestTag::Background => None,
        };

        debug!("Refreshing ticket list ({:?})", tag);
        match self.api.list_tickets(&self.query).await {
            Ok(tickets) => {
                let count = tickets.len();
                let mut state = self.state.write().await;
                state.tickets = tickets;
                state.refreshed_at = Some(Utc::now());
                state.last_error = None;
                Ok(count)
            }
            Err(e) => {
                self.state.write().await.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// True while a user-initiated refresh is outstanding
    pub fn is_loading(&self) -> bool {
        self.foreground_in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn tickets(&self) -> Vec<Ticket> {
        self.state.read().await.tickets.clone()
    }

    pub async fn ticket(&self, gmail_id: &str) -> Option<Ticket> {
        self.state
            .read()
            .await
            .tickets
            .iter()
            .find(|t| t.gmail_id == gmail_id)
            .cloned()
    }

    /// Monitor rows for the given filters and search query, in cache order
    pub async fn monitor(&self, filters: &FilterState, query: &str) -> Vec<Ticket> {
        let state = self.state.read().await;
        ticket_engine::monitor_view(&state.tickets, filters, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Every cached ticket passing the filters, without the VALID baseline
    pub async fn filtered(&self, filters: &FilterState, query: &str) -> Vec<Ticket> {
        let state = self.state.read().await;
        ticket_engine::filter_tickets(&state.tickets, filters, query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.refreshed_at
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn select(&self, gmail_id: Option<String>) {
        self.state.write().await.selected = gmail_id;
    }

    /// Clears the selection only if it still points at `gmail_id`
    pub async fn deselect(&self, gmail_id: &str) {
        let mut state = self.state.write().await;
        if state.selected.as_deref() == Some(gmail_id) {
            state.selected = None;
        }
    }

    pub async fn selected(&self) -> Option<String> {
        self.state.read().await.selected.clone()
    }

    pub async fn is_selected(&self, gmail_id: &str) -> bool {
        self.state.read().await.selected.as_deref() == Some(gmail_id)
    }

    /// Overwrites one attachment list of a cached ticket after a detail view settled it
    pub async fn replace_attachments(
        &self,
        gmail_id: &str,
        kind: AttachmentKind,
        files: Vec<AttachmentFile>,
    ) -> bool {
        let mut state = self.state.write().await;
        match state.tickets.iter_mut().find(|t| t.gmail_id == gmail_id) {
            Some(ticket) => {
                match kind {
                    AttachmentKind::Quotation => ticket.quotation_files = files,
                    AttachmentKind::Cpo => ticket.cpo_files = files,
                }
                true
            }
            None => false,
        }
    }

    pub async fn update_status(&self, gmail_id: &str, status: TicketStatus) -> Result<()> {
        let ticket_number = self.ticket_number(gmail_id).await?;
        self.api
            .update_status(&UpdateStatusRequest {
                ticket_number: ticket_number.clone(),
                status,
            })
            .await?;
        info!("Ticket {} moved to {}", ticket_number, status.code());

        self.refetch(RequestTag::Foreground).await?;
        Ok(())
    }

    pub async fn update_priority(&self, gmail_id: &str, priority: TicketPriority) -> Result<()> {
        let ticket_number = self.ticket_number(gmail_id).await?;
        self.api
            .update_priority(&UpdatePriorityRequest {
                ticket_number: ticket_number.clone(),
                priority,
            })
            .await?;
        info!("Ticket {} priority set to {}", ticket_number, priority.code());

        self.refetch(RequestTag::Foreground).await?;
        Ok(())
    }

    async fn ticket_number(&self, gmail_id: &str) -> Result<String> {
        let ticket = self
            .ticket(gmail_id)
            .await
            .ok_or_else(|| ClientError::TicketNotFound(gmail_id.to_string()))?;
        ticket
            .ticket_number
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ClientError::MissingTicketNumber(gmail_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ticket, FakeApi};

    fn store_with(api: &Arc<FakeApi>) -> TicketStore {
        TicketStore::new(api.clone(), ListTicketsQuery::default())
    }

    #[tokio::test]
    async fn test_refetch_replaces_cache() {
        let api = Arc::new(FakeApi::with_tickets(vec![ticket("g1"), ticket("g2")]));
        let store = store_with(&api);

        assert_eq!(store.refetch(RequestTag::Background).await.unwrap(), 2);
        assert!(store.refreshed_at().await.is_some());

        api.set_tickets(vec![ticket("g3")]);
        store.refetch(RequestTag::Foreground).await.unwrap();
        let ids: Vec<String> = store.tickets().await.into_iter().map(|t| t.gmail_id).collect();
        assert_eq!(ids, vec!["g3"]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_list() {
        let api = Arc::new(FakeApi::with_tickets(vec![ticket("g1")]));
        let store = store_with(&api);
        store.refetch(RequestTag::Foreground).await.unwrap();

        api.fail_list(true);
        assert!(store.refetch(RequestTag::Background).await.is_err());
        assert_eq!(store.tickets().await.len(), 1);
        assert!(store.last_error().await.is_some());

        api.fail_list(false);
        store.refetch(RequestTag::Background).await.unwrap();
        assert!(store.last_error().await.is_none());
    }

    #[tokio::test]
    async fn test_monitor_applies_valid_baseline() {
        let mut pending = ticket("g2");
        pending.extraction_status = Some("PENDING".to_string());
        let api = Arc::new(FakeApi::with_tickets(vec![ticket("g1"), pending]));
        let store = store_with(&api);
        store.refetch(RequestTag::Foreground).await.unwrap();

        let filters = FilterState::default();
        assert_eq!(store.monitor(&filters, "").await.len(), 1);
        assert_eq!(store.filtered(&filters, "").await.len(), 2);
        assert!(store.monitor(&filters, "no such text").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_refetches() {
        let api = Arc::new(FakeApi::with_tickets(vec![ticket("g1")]));
        let store = store_with(&api);
        store.refetch(RequestTag::Foreground).await.unwrap();
        let lists_before = api.list_calls();

        store.update_status("g1", TicketStatus::Sent).await.unwrap();
        assert_eq!(api.list_calls(), lists_before + 1);
        assert_eq!(api.calls().last().map(String::as_str), Some("list"));
        assert!(api.calls().contains(&"status TKT-g1 SENT".to_string()));
    }

    #[tokio::test]
    async fn test_update_priority_requires_ticket_number() {
        let mut unnumbered = ticket("g1");
        unnumbered.ticket_number = None;
        let api = Arc::new(FakeApi::with_tickets(vec![unnumbered]));
        let store = store_with(&api);
        store.refetch(RequestTag::Foreground).await.unwrap();

        let err = store
            .update_priority("g1", TicketPriority::Urgent)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingTicketNumber(_)));

        let err = store
            .update_priority("missing", TicketPriority::Urgent)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::TicketNotFound(_)));
    }

    #[tokio::test]
    async fn test_replace_attachments_and_selection() {
        let api = Arc::new(FakeApi::with_tickets(vec![ticket("g1")]));
        let store = store_with(&api);
        store.refetch(RequestTag::Foreground).await.unwrap();

        let file = AttachmentFile {
            name: Some("po.pdf".to_string()),
            ..Default::default()
        };
        assert!(store.replace_attachments("g1", AttachmentKind::Cpo, vec![file]).await);
        assert!(!store.replace_attachments("g9", AttachmentKind::Cpo, vec![]).await);
        assert_eq!(store.ticket("g1").await.unwrap().cpo_files.len(), 1);

        store.select(Some("g1".to_string())).await;
        store.deselect("g2").await;
        assert!(store.is_selected("g1").await);
        store.deselect("g1").await;
        assert!(store.selected().await.is_none());
    }
}
