//! Code synthesis API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{GenerateCodeBody, ValidateCodeBody};
use crate::domain::entities::{CodeTemplate, ValidationResult, ValidationRule};
use crate::domain::services::{
    parse_engine, CodeGenerationRequest, GeneratedCode, RuleError, TemplateError,
};
use crate::infrastructure::state::AppState;

fn bad_request(e: TemplateError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Render a template for the requested engine and category
pub async fn generate_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateCodeBody>,
) -> Result<Json<GeneratedCode>, (StatusCode, String)> {
    let request = CodeGenerationRequest::try_from(body).map_err(bad_request)?;
    let generated = state
        .code_synthesis
        .read()
        .await
        .generate_code(&request)
        .map_err(bad_request)?;
    Ok(Json(generated))
}

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Path(engine): Path<String>,
) -> Result<Json<Vec<CodeTemplate>>, (StatusCode, String)> {
    let engine = parse_engine(&engine).map_err(bad_request)?;
    Ok(Json(state.code_synthesis.read().await.templates(engine).to_vec()))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path((engine, id)): Path<(String, String)>,
) -> Result<Json<CodeTemplate>, (StatusCode, String)> {
    let engine = parse_engine(&engine).map_err(bad_request)?;
    state
        .code_synthesis
        .read()
        .await
        .get_template(engine, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Template not found: {}", id)))
}

/// Register a template; the template's engine must match the path
pub async fn add_template(
    State(state): State<Arc<AppState>>,
    Path(engine): Path<String>,
    Json(template): Json<CodeTemplate>,
) -> Result<(StatusCode, Json<CodeTemplate>), (StatusCode, String)> {
    let engine = parse_engine(&engine).map_err(bad_request)?;
    if template.engine != engine {
        return Err(bad_request(TemplateError::EngineMismatch {
            expected: engine,
            actual: template.engine,
        }));
    }
    state
        .code_synthesis
        .write()
        .await
        .add_template(template.clone())
        .map_err(bad_request)?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn validate_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValidateCodeBody>,
) -> Result<Json<ValidationResult>, (StatusCode, String)> {
    let engine = parse_engine(&body.engine).map_err(bad_request)?;
    Ok(Json(state.code_synthesis.read().await.validate(engine, &body.code)))
}

pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    Path(engine): Path<String>,
) -> Result<Json<Vec<ValidationRule>>, (StatusCode, String)> {
    let engine = parse_engine(&engine).map_err(bad_request)?;
    let synthesis = state.code_synthesis.read().await;
    Ok(Json(synthesis.rules(engine).into_iter().cloned().collect()))
}

/// Register a validation rule; the rule's engine must match the path
pub async fn add_rule(
    State(state): State<Arc<AppState>>,
    Path(engine): Path<String>,
    Json(rule): Json<ValidationRule>,
) -> Result<(StatusCode, Json<ValidationRule>), (StatusCode, String)> {
    let engine = parse_engine(&engine).map_err(bad_request)?;
    if rule.engine != engine {
        return Err(bad_request(TemplateError::EngineMismatch {
            expected: engine,
            actual: rule.engine,
        }));
    }
    state
        .code_synthesis
        .write()
        .await
        .add_rule(rule.clone())
        .map_err(|e: RuleError| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok((StatusCode::CREATED, Json(rule)))
}
