use crate::detail::TicketDetail;
use crate::store::{RequestTag, TicketStore};
use anyhow::{Context, Result};
use clap::Args;
use futures::future::join_all;
use shared_types::{AttachmentFile, AttachmentKind};
use std::path::PathBuf;
use std::sync::Arc;
use ticket_engine::timestamp::format_local_with;

use super::parse_kind;

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    pub gmail_id: String,
    /// quotation or cpo
    #[arg(long, value_parser = parse_kind, default_value = "quotation")]
    pub kind: AttachmentKind,
    /// Purchase order number, kept for CPO uploads only
    #[arg(long)]
    pub po_number: Option<String>,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    pub gmail_id: String,
    #[arg(long, value_parser = parse_kind, default_value = "quotation")]
    pub kind: AttachmentKind,
    pub file_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct SetAmountArgs {
    pub gmail_id: String,
    pub file_id: String,
    pub amount: String,
}

/// Uploads every file concurrently, then prints the resulting attachment list
pub async fn upload(store: Arc<TicketStore>, timestamp_format: &str, args: &UploadArgs) -> Result<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        files.push((name, content));
    }

    let detail = open(store, &args.gmail_id).await?;
    let po_number = match args.kind {
        AttachmentKind::Cpo => args.po_number.clone(),
        AttachmentKind::Quotation => None,
    };
    let uploads = files.into_iter().map(|(name, content)| {
        let detail = detail.clone();
        let po_number = po_number.clone();
        async move {
            let result = detail.upload(args.kind, &name, content, po_number).await;
            (name, result)
        }
    });

    let mut failures = 0;
    for (name, result) in join_all(uploads).await {
        match result {
            Ok(file) => println!("uploaded {} as {}", name, file.key().unwrap_or("-")),
            Err(e) => {
                failures += 1;
                println!("failed {}: {}", name, e);
            }
        }
    }

    print_files(&detail, args.kind, timestamp_format).await;
    detail.close().await;
    if failures > 0 {
        anyhow::bail!("{} of {} uploads failed", failures, args.files.len());
    }
    Ok(())
}

pub async fn delete(store: Arc<TicketStore>, timestamp_format: &str, args: &DeleteArgs) -> Result<()> {
    let detail = open(store, &args.gmail_id).await?;
    let result = detail.delete(args.kind, &args.file_id).await;
    print_files(&detail, args.kind, timestamp_format).await;
    detail.close().await;
    result.with_context(|| format!("Failed to delete {}", args.file_id))
}

pub async fn set_amount(store: Arc<TicketStore>, timestamp_format: &str, args: &SetAmountArgs) -> Result<()> {
    let detail = open(store, &args.gmail_id).await?;
    let result = detail.edit_amount(&args.file_id, &args.amount).await;
    print_files(&detail, AttachmentKind::Quotation, timestamp_format).await;
    detail.close().await;

    if !result.with_context(|| format!("Failed to update amount of {}", args.file_id))? {
        println!("amount unchanged");
    }
    Ok(())
}

async fn open(store: Arc<TicketStore>, gmail_id: &str) -> Result<TicketDetail> {
    store
        .refetch(RequestTag::Foreground)
        .await
        .context("Failed to load tickets")?;
    TicketDetail::open(store, gmail_id)
        .await
        .with_context(|| format!("Failed to open ticket {}", gmail_id))
}

async fn print_files(detail: &TicketDetail, kind: AttachmentKind, timestamp_format: &str) {
    let files = detail.visible(kind).await;
    println!("{} {} files on {}", files.len(), kind.label(), detail.gmail_id());
    for file in &files {
        println!("  {}", render_file(file, timestamp_format));
    }
}

fn render_file(file: &AttachmentFile, timestamp_format: &str) -> String {
    let mut line = format!(
        "{:<16} {:<32} amount={}",
        file.key().unwrap_or("-"),
        file.display_name(),
        file.amount
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    if let Some(reference) = &file.reference_id {
        line.push_str(&format!(" ref={}", reference));
    }
    if let Some(po_number) = &file.po_number {
        line.push_str(&format!(" po={}", po_number));
    }
    line.push_str(&format!(
        " {}",
        format_local_with(file.uploaded_at.as_deref(), timestamp_format)
    ));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{FileId, Scalar};

    #[test]
    fn test_render_file() {
        let file = AttachmentFile {
            id: Some(FileId::from(501)),
            name: Some("quote.pdf".to_string()),
            amount: Some(Scalar::from(1250.0)),
            reference_id: Some("Q-2024-017".to_string()),
            uploaded_at: Some("2024-06-15 09:05:00".to_string()),
            ..Default::default()
        };
        let line = render_file(&file, "%Y-%m-%d");
        assert!(line.starts_with("501 "));
        assert!(line.contains("amount=1250"));
        assert!(line.contains("ref=Q-2024-017"));
        assert!(!line.contains("po="));
        assert!(line.ends_with("2024-06-15"));
    }

    #[test]
    fn test_render_placeholder() {
        let file = AttachmentFile {
            name: Some("pending.pdf".to_string()),
            ..Default::default()
        };
        let line = render_file(&file, "%Y");
        assert!(line.contains("pending.pdf"));
        assert!(line.contains("amount=-"));
        assert!(line.ends_with(" -"));
    }
}
