//! Ticket Engine Crate
//!
//! Client-side logic of the quotation desk, free of any I/O so it can be re-derived on
//! every render and tested in isolation.
//!
//! # Modules
//!
//! - `search`: free-text matcher across every ticket field a user might type
//! - `filter`: multi-criteria filter engine and the draft/apply filter panel
//! - `reconcile`: optimistic attachment list merging server state with local uploads/deletes
//! - `analytics`: view-model derivation for employee analytics
//! - `sender`, `timestamp`: parsing helpers shared by the above
//!
//! # Example
//!
//! ```rust,ignore
//! use ticket_engine::{monitor_view, FilterPanel};
//!
//! let panel = FilterPanel::new();
//! let visible = monitor_view(&tickets, panel.applied(), "tkt-002");
//! ```

pub mod analytics;
pub mod filter;
pub mod reconcile;
pub mod search;
pub mod sender;
pub mod timestamp;

// Re-export commonly used items
pub use analytics::{conversion_rate, AnalyticsView};
pub use filter::{
    active_filter_count, effective_status, filter_tickets, matches_filters, monitor_view,
    ticket_amount, FilterPanel, VALID_EXTRACTION,
};
pub use reconcile::{
    attachments_of, normalize_server_files, AttachmentReconciler, DeleteSnapshot, Observation,
    ReconcileError,
};
pub use search::search_matches;
pub use sender::{parse_sender, sender_label};
