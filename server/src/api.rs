use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use drive_relay_auth::AuthorizedSession;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::drive::{CreatedResource, ResourceKind};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateDocResponse {
    pub success: bool,
    #[serde(rename = "docId")]
    pub doc_id: String,
    pub link: String,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSheetResponse {
    pub success: bool,
    #[serde(rename = "sheetId")]
    pub sheet_id: String,
    pub name: String,
    pub link: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Requested name, or the kind's default when none was given
fn resource_name(request: &CreateRequest, kind: ResourceKind) -> Result<String, ApiError> {
    match request.name.as_deref().map(str::trim) {
        None => Ok(match kind {
            ResourceKind::Document => "Test Document".to_string(),
            ResourceKind::Sheet => "Test Sheet".to_string(),
        }),
        Some("") => Err(ApiError::InvalidRequest("name must not be empty".to_string())),
        Some(name) => Ok(name.to_string()),
    }
}

async fn create(
    state: &AppState,
    session: &AuthorizedSession,
    kind: ResourceKind,
    request: &CreateRequest,
) -> Result<CreatedResource, ApiError> {
    let name = resource_name(request, kind)?;
    state
        .drive
        .create_resource(kind, &name, &session.bundle)
        .await
        .map_err(|e| ApiError::creation(kind, e))
}

/// Create a Google Document in the caller's Drive
pub async fn create_doc(
    State(state): State<AppState>,
    Extension(session): Extension<AuthorizedSession>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<CreateDocResponse>, ApiError> {
    let Json(request) = payload?;
    let created = create(&state, &session, ResourceKind::Document, &request).await?;

    Ok(Json(CreateDocResponse {
        success: true,
        message: format!("Google Document '{}' created successfully!", created.name),
        doc_id: created.id,
        link: created.link,
        name: created.name,
    }))
}

/// Create a Google Sheet in the caller's Drive
pub async fn create_sheet(
    State(state): State<AppState>,
    Extension(session): Extension<AuthorizedSession>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<CreateSheetResponse>, ApiError> {
    let Json(request) = payload?;
    let created = create(&state, &session, ResourceKind::Sheet, &request).await?;

    Ok(Json(CreateSheetResponse {
        success: true,
        message: format!("Google Sheet '{}' created successfully!", created.name),
        sheet_id: created.id,
        name: created.name,
        link: created.link,
    }))
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Google Drive relay is running",
    })
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Google Drive Integration API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "GET /auth - Start Google authentication",
            "logout": "GET /logout - Clear the session",
            "create_doc": "POST /create_doc - Create a Google Document",
            "create_sheet": "POST /create_sheet - Create a Google Sheet",
            "health": "GET /health - Health check",
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_uses_kind_default() {
        let request = CreateRequest::default();
        assert_eq!(resource_name(&request, ResourceKind::Document).unwrap(), "Test Document");
        assert_eq!(resource_name(&request, ResourceKind::Sheet).unwrap(), "Test Sheet");
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let request = CreateRequest {
            name: Some("   ".to_string()),
        };
        assert!(matches!(
            resource_name(&request, ResourceKind::Document),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_name_is_trimmed() {
        let request: CreateRequest = serde_json::from_str(r#"{"name": "  Meeting Notes "}"#).unwrap();
        assert_eq!(resource_name(&request, ResourceKind::Document).unwrap(), "Meeting Notes");
    }

    #[test]
    fn test_doc_response_uses_camel_case_id() {
        let resp = CreateDocResponse {
            success: true,
            doc_id: "doc-1".to_string(),
            link: "https://docs.google.com/document/d/doc-1/edit".to_string(),
            name: "Notes".to_string(),
            message: "ok".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["docId"], "doc-1");
        assert!(json.get("doc_id").is_none());
    }
}
