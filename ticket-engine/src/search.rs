use shared_types::{AttachmentFile, InternalNote, Scalar, Ticket};

/// Lowercased query tested against the lowercased form of each field
struct Needle(String);

impl Needle {
    fn hits(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.0)
    }

    fn hits_opt(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| self.hits(v))
    }

    fn hits_scalar(&self, value: Option<&Scalar>) -> bool {
        value.is_some_and(|v| self.hits(&v.to_string()))
    }

    fn hits_file(&self, file: &AttachmentFile) -> bool {
        self.hits_opt(file.name.as_deref())
            || self.hits_opt(file.reference_id.as_deref())
            || self.hits_scalar(file.amount.as_ref())
            || self.hits_opt(file.po_number.as_deref())
    }

    fn hits_note(&self, note: &InternalNote) -> bool {
        match note {
            InternalNote::Text(text) => self.hits(text),
            InternalNote::Entry { content, text, .. } => {
                self.hits_opt(content.as_deref()) || self.hits_opt(text.as_deref())
            }
        }
    }
}

/// Returns true when `query` appears anywhere a user would reasonably look for it.
///
/// Covers top-level ticket attributes, extraction results and line items, both
/// attachment lists, activity logs and internal notes. Status codes also match their
/// spaced form ("order confirmed"), and the ticket number matches on any of its
/// dash-separated segments. An empty query matches every ticket.
pub fn search_matches(ticket: &Ticket, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let needle = Needle(query.to_lowercase());

    matches_top_level(ticket, &needle)
        || matches_ticket_number_segments(ticket, &needle)
        || matches_extraction(ticket, &needle)
        || ticket
            .quotation_files
            .iter()
            .chain(ticket.cpo_files.iter())
            .any(|file| needle.hits_file(file))
        || ticket.activity_logs.iter().any(|log| {
            needle.hits_opt(log.action.as_deref())
                || needle.hits_opt(log.description.as_deref())
                || needle.hits_opt(log.user.as_deref())
        })
        || ticket.internal_notes.iter().any(|note| needle.hits_note(note))
}

fn matches_top_level(ticket: &Ticket, needle: &Needle) -> bool {
    let status = ticket.ticket_status.as_deref();

    needle.hits(&ticket.id.to_string())
        || needle.hits(&ticket.gmail_id)
        || needle.hits_opt(ticket.ticket_number.as_deref())
        || needle.hits_opt(status)
        || status.is_some_and(|s| needle.hits(&s.replace('_', " ")))
        || needle.hits_opt(ticket.ticket_priority.as_deref())
        || needle.hits_scalar(ticket.quotation_amount.as_ref())
        || needle.hits_opt(ticket.sender.as_deref())
        || needle.hits_opt(ticket.company_name.as_deref())
        || needle.hits_opt(ticket.subject.as_deref())
        || needle.hits_opt(ticket.body_text.as_deref())
        || needle.hits_opt(ticket.extraction_status.as_deref())
        || needle.hits_opt(ticket.assigned_to.as_deref())
        || needle.hits_opt(ticket.received_at.as_deref())
        || needle.hits_opt(ticket.created_at.as_deref())
        || needle.hits_opt(ticket.updated_at.as_deref())
}

// "002" finds "TKT-002"
fn matches_ticket_number_segments(ticket: &Ticket, needle: &Needle) -> bool {
    ticket
        .ticket_number
        .as_deref()
        .is_some_and(|number| number.split('-').any(|segment| needle.hits(segment)))
}

fn matches_extraction(ticket: &Ticket, needle: &Needle) -> bool {
    let Some(result) = &ticket.extraction_result else {
        return false;
    };

    needle.hits_opt(result.email.as_deref())
        || needle.hits_scalar(result.mobile.as_ref())
        || needle.hits_opt(result.to.as_deref())
        || result.requirements.iter().any(|item| {
            needle.hits_opt(item.description.as_deref())
                || needle.hits_scalar(item.quantity.as_ref())
                || needle.hits_opt(item.unit.as_deref())
                || needle.hits_scalar(item.unit_price.as_ref())
        })
}
