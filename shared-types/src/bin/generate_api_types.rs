use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for the web front-end
    let mut types = Vec::new();

    // Ticket types
    types.push(clean_type(Ticket::export_to_string()?));
    types.push(clean_type(TicketStatus::export_to_string()?));
    types.push(clean_type(TicketPriority::export_to_string()?));
    types.push(clean_type(ExtractionResult::export_to_string()?));
    types.push(clean_type(Requirement::export_to_string()?));
    types.push(clean_type(ActivityLog::export_to_string()?));
    types.push(clean_type(InternalNote::export_to_string()?));
    types.push(clean_type(Scalar::export_to_string()?));
    types.push(clean_type(EmailAddress::export_to_string()?));

    // Attachment types
    types.push(clean_type(AttachmentFile::export_to_string()?));
    types.push(clean_type(FileId::export_to_string()?));
    types.push(clean_type(AttachmentKind::export_to_string()?));

    // Filter types
    types.push(clean_type(FilterState::export_to_string()?));
    types.push(clean_type(StatusLabel::export_to_string()?));
    types.push(clean_type(DateField::export_to_string()?));
    types.push(clean_type(Presence::export_to_string()?));

    // Request / response types
    types.push(clean_type(ListTicketsQuery::export_to_string()?));
    types.push(clean_type(ListTicketsResponse::export_to_string()?));
    types.push(clean_type(UploadAttachmentResponse::export_to_string()?));
    types.push(clean_type(SuccessResponse::export_to_string()?));
    types.push(clean_type(UpdateFileAmountRequest::export_to_string()?));
    types.push(clean_type(UpdateStatusRequest::export_to_string()?));
    types.push(clean_type(UpdatePriorityRequest::export_to_string()?));
    types.push(clean_type(DateRangeQuery::export_to_string()?));

    // Analytics types
    types.push(clean_type(Kpis::export_to_string()?));
    types.push(clean_type(Funnel::export_to_string()?));
    types.push(clean_type(Workload::export_to_string()?));
    types.push(clean_type(EmployeeAnalyticsResponse::export_to_string()?));

    let output_dir = Path::new("../web/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Everything lands in one file, so cross-type imports are dropped
    let filtered: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
