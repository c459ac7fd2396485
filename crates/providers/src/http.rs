use crate::backend::{BackendReply, ChatBackend, ChatSubmission, Upload};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::attachment::AttachmentKind;
use shared::models::{ModelInfo, ModelList};
use shared::settings::ClientSettings;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    document_warning: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the companion chat server (`/api/models`, `/api/chat`).
pub struct HttpBackend {
    http: Client,
    base: String,
}

impl HttpBackend {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .pool_max_idle_per_host(2)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base: settings.backend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn build_form(submission: ChatSubmission) -> Result<Form> {
        let form = form_fields(submission)?
            .into_iter()
            .fold(Form::new(), |form, field| match field {
                FormField::Text(name, value) => form.text(name, value),
                FormField::File {
                    name,
                    file_name,
                    bytes,
                } => form.part(name, Part::bytes(bytes).file_name(file_name)),
            });
        Ok(form)
    }
}

/// One multipart field of a `/api/chat` request
#[derive(Debug, Clone, PartialEq)]
enum FormField {
    Text(&'static str, String),
    File {
        name: &'static str,
        file_name: String,
        bytes: Vec<u8>,
    },
}

fn form_fields(submission: ChatSubmission) -> Result<Vec<FormField>> {
    let mut fields = vec![
        FormField::Text("prompt", submission.prompt),
        FormField::Text("history", serde_json::to_string(&submission.history)?),
        FormField::Text("model", submission.model),
    ];

    if let Some(lang) = submission.lang {
        fields.push(FormField::Text("lang", lang));
    }

    if let Some(Upload {
        kind,
        file_name,
        bytes,
    }) = submission.upload
    {
        fields.push(FormField::Text("upload_kind", kind.as_str().to_string()));
        // The server reads images from either field; send both like the web client.
        if kind == AttachmentKind::Image {
            fields.push(FormField::File {
                name: "image",
                file_name: file_name.clone(),
                bytes: bytes.clone(),
            });
        }
        fields.push(FormField::File {
            name: "upload",
            file_name,
            bytes,
        });
    }

    Ok(fields)
}

fn failure_message(status: StatusCode, error: Option<String>) -> anyhow::Error {
    match error.filter(|e| !e.trim().is_empty()) {
        Some(message) => anyhow!(message),
        None => anyhow!(
            "{}",
            status.canonical_reason().unwrap_or("request failed")
        ),
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/models", self.base);
        tracing::debug!("fetching model list from {}", url);
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let error = serde_json::from_str::<ModelList>(&body)
                .ok()
                .and_then(|b| b.error);
            return Err(failure_message(status, error));
        }

        let list: ModelList =
            serde_json::from_str(&body).context("malformed /api/models response")?;
        Ok(list.models)
    }

    async fn chat(&self, submission: ChatSubmission) -> Result<BackendReply> {
        let url = format!("{}/api/chat", self.base);
        tracing::debug!(
            model = %submission.model,
            upload = ?submission.upload.as_ref().map(|u| u.kind),
            "submitting chat turn"
        );
        let form = Self::build_form(submission)?;
        let resp = self.http.post(url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let parsed = serde_json::from_str::<ChatResponse>(&body);

        if !status.is_success() {
            return Err(failure_message(status, parsed.ok().and_then(|b| b.error)));
        }

        let data = parsed.context("malformed /api/chat response")?;
        Ok(BackendReply {
            reply: data.reply.unwrap_or_default(),
            document_warning: data.document_warning.filter(|w| !w.is_empty()),
        })
    }
}
