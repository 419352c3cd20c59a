//! Client for the Google Drive file-creation endpoint.
//!
//! Creation is not idempotent, so failed calls are reported as-is and never
//! retried.

use drive_relay_auth::CredentialBundle;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::DriveConfig;

/// Kind of Google Workspace file to create
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Document,
    Sheet,
}

impl ResourceKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ResourceKind::Document => "application/vnd.google-apps.document",
            ResourceKind::Sheet => "application/vnd.google-apps.spreadsheet",
        }
    }

    /// Editor URL for a file of this kind, used when Drive omits `webViewLink`
    pub fn edit_link(self, id: &str) -> String {
        let path = match self {
            ResourceKind::Document => "document",
            ResourceKind::Sheet => "spreadsheets",
        };
        format!("https://docs.google.com/{}/d/{}/edit", path, id)
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Document => "Google Document",
            ResourceKind::Sheet => "Google Sheet",
        }
    }
}

/// File as reported back by Drive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedResource {
    pub id: String,
    pub name: String,
    pub link: String,
}

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Drive API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Drive API request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    mime_type: &'a str,
    parents: [&'a str; 1],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResponse {
    id: String,
    name: Option<String>,
    web_view_link: Option<String>,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

pub struct DriveClient {
    client: Client,
    api_base: String,
}

impl DriveClient {
    pub fn new(config: &DriveConfig) -> Result<Self, DriveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Create an empty file of `kind` in the user's Drive root
    pub async fn create_resource(
        &self,
        kind: ResourceKind,
        name: &str,
        bundle: &CredentialBundle,
    ) -> Result<CreatedResource, DriveError> {
        let url = format!("{}/drive/v3/files", self.api_base);
        let metadata = FileMetadata {
            name,
            mime_type: kind.mime_type(),
            parents: ["root"],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("fields", "id,name,webViewLink")])
            .bearer_auth(&bundle.access_token)
            .json(&metadata)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!("Drive API rejected {} creation: {} {}", kind.label(), status, message);
            return Err(DriveError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let file: FileResponse = response.json().await?;
        tracing::info!(file_id = %file.id, "{} created", kind.label());

        Ok(CreatedResource {
            name: file.name.unwrap_or_else(|| name.to_string()),
            link: file
                .web_view_link
                .filter(|link| !link.is_empty())
                .unwrap_or_else(|| kind.edit_link(&file.id)),
            id: file.id,
        })
    }
}
