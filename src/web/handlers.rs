use crate::github;
use crate::llm;
use crate::uml::{assembler, encoder, DiagramType, SourceFile};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Error mapping
// ============================================================================

/// Errors that reach the client, mapped to HTTP status codes. The wire
/// shape matches what the frontend expects: `error`, optional `details`,
/// and `isConfigurationError` for deployment problems.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("OpenAI API key is missing in server configuration")]
    MissingApiKey,

    #[error("{message}")]
    Internal { message: String, details: String },
}

impl ApiError {
    fn internal(message: &str, source: anyhow::Error) -> Self {
        ApiError::Internal {
            message: message.to_string(),
            details: format!("{source:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            ApiError::MissingApiKey => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": "OpenAI API key is missing in server configuration",
                    "details": "Please configure OPENAI_API_KEY in the server environment",
                    "isConfigurationError": true,
                })),
            )
                .into_response(),
            ApiError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": message, "details": details })),
            )
                .into_response(),
        }
    }
}

// ============================================================================
// OAuth and health
// ============================================================================

#[derive(Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    code: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    access_token: String,
}

/// API: Exchange a GitHub OAuth authorization code for an access token
pub async fn exchange_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if req.code.is_empty() {
        return Err(ApiError::BadRequest(
            "Authorization code is required".to_string(),
        ));
    }

    tracing::info!("Exchanging authorization code for access token");

    let access_token = state
        .github
        .exchange_code(&req.code)
        .await
        .map_err(|e| ApiError::internal("Failed to exchange code for token", e))?;

    Ok(Json(TokenResponse { access_token }))
}

/// API: Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================================
// Diagram generation
// ============================================================================

#[derive(Deserialize)]
pub struct GenerateUmlRequest {
    #[serde(default)]
    files: Vec<SourceFile>,
    // Accepted for API compatibility; the extractor handles the same
    // Java-like syntax family regardless.
    #[serde(default)]
    #[allow(dead_code)]
    language: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UmlResponse {
    plant_uml_code: String,
    diagram_url: String,
    encoded_uml: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzed_files: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiGenerateRequest {
    #[serde(default)]
    owner: String,
    #[serde(default)]
    repo: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    diagram_type: DiagramType,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusedAiGenerateRequest {
    #[serde(default)]
    owner: String,
    #[serde(default)]
    repo: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    diagram_type: DiagramType,
    #[serde(default)]
    focus_context: String,
    #[serde(default)]
    custom_prompt: String,
    #[serde(default)]
    included_classes: Vec<String>,
}

/// API: Deterministic class diagram from caller-supplied files
pub async fn generate_uml(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateUmlRequest>,
) -> Result<Json<UmlResponse>, ApiError> {
    if req.files.is_empty() {
        return Err(ApiError::BadRequest("Files are required".to_string()));
    }

    tracing::info!("Generating UML diagram for {} files", req.files.len());

    let plant_uml_code = assembler::assemble(&req.files);
    respond_with_diagram(&state, plant_uml_code, None)
}

/// API: AI-generated diagram for a whole repository
pub async fn ai_generate_uml(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AiGenerateRequest>,
) -> Result<Json<UmlResponse>, ApiError> {
    validate_repo_params(&req.owner, &req.repo, &req.token)?;
    ensure_llm_configured(&state)?;

    tracing::info!("Analyzing repository: {}/{}", req.owner, req.repo);

    let sources = fetch_repository_sources(&state, &req.owner, &req.repo, &req.token).await?;
    let analyzed = sources.len();

    let diagram = llm::generate_diagram(&state.llm, &sources, req.diagram_type).await;
    respond_with_diagram(&state, diagram, Some(analyzed))
}

/// API: AI-generated diagram focused on a phrase or class list
pub async fn ai_generate_uml_focused(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FocusedAiGenerateRequest>,
) -> Result<Json<UmlResponse>, ApiError> {
    validate_repo_params(&req.owner, &req.repo, &req.token)?;
    ensure_llm_configured(&state)?;

    tracing::info!(
        "Analyzing repository with focus: {}/{} (focus: {:?}, {} classes)",
        req.owner,
        req.repo,
        req.focus_context,
        req.included_classes.len()
    );

    let sources = fetch_repository_sources(&state, &req.owner, &req.repo, &req.token).await?;
    let analyzed = sources.len();

    let diagram = llm::generate_focused_diagram(
        &state.llm,
        &sources,
        req.diagram_type,
        &req.focus_context,
        &req.custom_prompt,
        &req.included_classes,
    )
    .await;
    respond_with_diagram(&state, diagram, Some(analyzed))
}

// ============================================================================
// Shared steps
// ============================================================================

fn validate_repo_params(owner: &str, repo: &str, token: &str) -> Result<(), ApiError> {
    if owner.is_empty() || repo.is_empty() || token.is_empty() {
        return Err(ApiError::BadRequest(
            "Repository owner, name, and GitHub token are required".to_string(),
        ));
    }
    Ok(())
}

fn ensure_llm_configured(state: &AppState) -> Result<(), ApiError> {
    if !state.llm.is_configured() {
        tracing::error!("API request received but OpenAI API key is missing");
        return Err(ApiError::MissingApiKey);
    }
    Ok(())
}

async fn fetch_repository_sources(
    state: &AppState,
    owner: &str,
    repo: &str,
    token: &str,
) -> Result<Vec<SourceFile>, ApiError> {
    let repo_files = state
        .github
        .list_repository_files(owner, repo, token)
        .await
        .map_err(|e| ApiError::internal("Failed to list repository files", e))?;
    tracing::info!("Found {} total files", repo_files.len());

    let code_files = github::filter_code_files(&repo_files);
    tracing::info!("Found {} code files after filtering", code_files.len());

    if code_files.is_empty() {
        return Err(ApiError::BadRequest(
            "No suitable code files found in the repository".to_string(),
        ));
    }

    let limits = &state.config.limits;
    let sources = state
        .github
        .fetch_contents(
            owner,
            repo,
            token,
            &code_files,
            limits.max_files,
            limits.max_file_size,
        )
        .await;
    tracing::info!("Retrieved content for {} files", sources.len());

    Ok(sources)
}

fn respond_with_diagram(
    state: &AppState,
    plant_uml_code: String,
    analyzed_files: Option<usize>,
) -> Result<Json<UmlResponse>, ApiError> {
    let encoded_uml = encoder::encode(&plant_uml_code)
        .map_err(|e| ApiError::internal("Failed to encode diagram", e))?;
    let diagram_url = encoder::diagram_url(&state.config.plantuml.server_url, &encoded_uml);

    Ok(Json(UmlResponse {
        plant_uml_code,
        diagram_url,
        encoded_uml,
        analyzed_files,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_repo_params_rejects_missing_fields() {
        assert!(validate_repo_params("", "repo", "token").is_err());
        assert!(validate_repo_params("owner", "", "token").is_err());
        assert!(validate_repo_params("owner", "repo", "").is_err());
        assert!(validate_repo_params("owner", "repo", "token").is_ok());
    }

    #[test]
    fn test_uml_response_uses_camel_case_fields() {
        let response = UmlResponse {
            plant_uml_code: "@startuml\n\n@enduml".to_string(),
            diagram_url: "http://example/img/x".to_string(),
            encoded_uml: "x".to_string(),
            analyzed_files: Some(3),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("plantUmlCode").is_some());
        assert!(json.get("diagramUrl").is_some());
        assert!(json.get("encodedUml").is_some());
        assert_eq!(json["analyzedFiles"], 3);
    }

    #[test]
    fn test_uml_response_omits_analyzed_files_when_absent() {
        let response = UmlResponse {
            plant_uml_code: String::new(),
            diagram_url: String::new(),
            encoded_uml: String::new(),
            analyzed_files: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("analyzedFiles").is_none());
    }

    #[test]
    fn test_focused_request_deserializes_camel_case() {
        let json = r#"{
            "owner": "octocat",
            "repo": "hello",
            "token": "t",
            "diagramType": "sequence",
            "focusContext": "payments",
            "customPrompt": "keep it small",
            "includedClasses": ["Account"]
        }"#;
        let req: FocusedAiGenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.diagram_type, DiagramType::Sequence);
        assert_eq!(req.focus_context, "payments");
        assert_eq!(req.included_classes, vec!["Account".to_string()]);
    }

    #[test]
    fn test_ai_request_defaults_to_class_diagram() {
        let json = r#"{"owner": "o", "repo": "r", "token": "t"}"#;
        let req: AiGenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.diagram_type, DiagramType::Class);
    }
}
