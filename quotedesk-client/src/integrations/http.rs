use super::{TicketApi, UploadRequest};
use crate::config::BackendConfig;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared_types::{
    AttachmentFile, AttachmentKind, DateRangeQuery, EmployeeAnalyticsResponse, ErrorResponse,
    FileId, ListTicketsQuery, ListTicketsResponse, SuccessResponse, Ticket,
    UpdateFileAmountRequest, UpdatePriorityRequest, UpdateStatusRequest,
    UploadAttachmentResponse,
};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpTicketApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTicketApi {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("quotedesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.authorized(builder).send().await?;
        read_json(response).await
    }

    async fn send_ack(&self, builder: RequestBuilder) -> Result<()> {
        let ack: SuccessResponse = self.send(builder).await?;
        if ack.success {
            Ok(())
        } else {
            Err(ClientError::Rejected(
                ack.message.unwrap_or_else(|| "request was not accepted".to_string()),
            ))
        }
    }
}

fn upload_path(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::Quotation => "ticket/upload-quotation",
        AttachmentKind::Cpo => "ticket/upload-cpo",
    }
}

fn delete_path(kind: AttachmentKind, file_id: &FileId) -> String {
    match kind {
        AttachmentKind::Quotation => format!("quotation/delete/{}", file_id),
        AttachmentKind::Cpo => format!("cpo/delete/{}", file_id),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Backend {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(response.json().await?)
}

fn accept_analytics(
    response: EmployeeAnalyticsResponse,
    employee_id: i64,
) -> Result<EmployeeAnalyticsResponse> {
    if response.success {
        Ok(response)
    } else {
        Err(ClientError::Rejected(format!(
            "analytics for employee {} unavailable",
            employee_id
        )))
    }
}

/// Best human-readable message from an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(ErrorResponse::into_message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl TicketApi for HttpTicketApi {
    async fn list_tickets(&self, query: &ListTicketsQuery) -> Result<Vec<Ticket>> {
        debug!("GET /emails {:?}", query);
        let response: ListTicketsResponse =
            self.send(self.client.get(self.url("emails")).query(query)).await?;

        if !response.success {
            return Err(ClientError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "ticket list unavailable".to_string()),
            ));
        }
        Ok(response.data)
    }

    async fn upload_attachment(
        &self,
        kind: AttachmentKind,
        upload: UploadRequest,
    ) -> Result<AttachmentFile> {
        let file_name = upload.file_name.clone();
        // Empty amount asks the backend to extract it from the document
        let mut form = Form::new()
            .part("file", Part::bytes(upload.content).file_name(upload.file_name))
            .text("gmail_id", upload.gmail_id)
            .text("amount", "");
        if let Some(po_number) = upload.po_number {
            form = form.text("po_number", po_number);
        }

        debug!("Uploading {} as {}", file_name, kind.label());
        let response: UploadAttachmentResponse = self
            .send(self.client.post(self.url(upload_path(kind))).multipart(form))
            .await?;

        match response.file {
            Some(file) if response.success => Ok(file),
            _ => Err(ClientError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| format!("upload of {} failed", file_name)),
            )),
        }
    }

    async fn delete_attachment(&self, kind: AttachmentKind, file_id: &FileId) -> Result<()> {
        self.send_ack(self.client.delete(self.url(&delete_path(kind, file_id))))
            .await
    }

    async fn update_file_amount(&self, request: &UpdateFileAmountRequest) -> Result<()> {
        self.send_ack(
            self.client
                .post(self.url("ticket/update-file-amount"))
                .json(request),
        )
        .await
    }

    async fn update_status(&self, request: &UpdateStatusRequest) -> Result<()> {
        self.send_ack(self.client.post(self.url("ticket/update-status")).json(request))
            .await
    }

    async fn update_priority(&self, request: &UpdatePriorityRequest) -> Result<()> {
        self.send_ack(
            self.client
                .post(self.url("ticket/update-priority"))
                .json(request),
        )
        .await
    }

    async fn employee_analytics(
        &self,
        employee_id: i64,
        range: &DateRangeQuery,
    ) -> Result<EmployeeAnalyticsResponse> {
        let path = format!("admin/employee-analytics/{}", employee_id);
        let response = self.send(self.client.get(self.url(&path)).query(range)).await?;
        accept_analytics(response, employee_id)
    }
}
