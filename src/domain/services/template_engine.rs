//! Template engine - Placeholder substitution over an engine's template catalog
//!
//! Engine-specific behavior (built-in templates, customization, file naming)
//! lives behind [`EngineProfile`]; the catalog, parameter resolution and
//! validation are shared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::code_validator::CodeValidator;
use crate::domain::entities::{CodeLanguage, CodeTemplate, GameEngine, ValidationResult};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("No template found for category: {0}")]
    TemplateNotFound(String),

    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("Unsupported engine: {0}")]
    UnsupportedEngine(String),

    #[error("Template targets {actual}, expected {expected}")]
    EngineMismatch {
        expected: GameEngine,
        actual: GameEngine,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeGenerationRequest {
    pub engine: GameEngine,
    pub category: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<Map<String, Value>>,
}

impl CodeGenerationRequest {
    pub fn new(engine: GameEngine, category: impl Into<String>) -> Self {
        Self {
            engine,
            category: category.into(),
            parameters: Map::new(),
            customization: None,
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn customize(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.customization
            .get_or_insert_with(Map::new)
            .insert(name.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub generated_at: DateTime<Utc>,
    pub template_id: String,
    pub category: String,
    /// Parameter values actually substituted, defaults included
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub engine: GameEngine,
    pub language: CodeLanguage,
    pub filename: String,
    pub code: String,
    pub validation: ValidationResult,
    pub metadata: GenerationMetadata,
}

/// Engine-specific half of a template engine
pub trait EngineProfile: Send + Sync {
    fn engine(&self) -> GameEngine;

    /// Templates registered when the engine is created
    fn builtin_templates(&self) -> Vec<CodeTemplate>;

    /// Free-form text post-processing driven by request customization
    fn apply_customization(&self, code: String, customization: &Map<String, Value>) -> String;

    /// File stem used when no `className` parameter is available
    fn default_file_stem(&self) -> &'static str;
}

pub struct TemplateEngine {
    profile: Box<dyn EngineProfile>,
    templates: Vec<CodeTemplate>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("engine", &self.profile.engine())
            .field("templates", &self.templates.len())
            .finish()
    }
}

impl TemplateEngine {
    pub fn new(profile: Box<dyn EngineProfile>) -> Self {
        let templates = profile.builtin_templates();
        Self { profile, templates }
    }

    pub fn engine(&self) -> GameEngine {
        self.profile.engine()
    }

    pub fn generate_code(
        &self,
        request: &CodeGenerationRequest,
        validator: &CodeValidator,
    ) -> Result<GeneratedCode, TemplateError> {
        let engine = self.engine();
        if request.engine != engine {
            return Err(TemplateError::EngineMismatch {
                expected: engine,
                actual: request.engine,
            });
        }

        let template = self
            .find_template(&request.category)
            .ok_or_else(|| TemplateError::TemplateNotFound(request.category.clone()))?;

        let mut resolved = Map::new();
        let mut code = template.code.clone();
        for param in &template.parameters {
            let value = present(request.parameters.get(&param.name))
                .or_else(|| present(param.default_value.as_ref()));
            let value = match value {
                Some(value) => value,
                None if param.required => {
                    return Err(TemplateError::MissingRequiredParameter(param.name.clone()))
                }
                None => {
                    code = code.replace(&param.placeholder(), "");
                    continue;
                }
            };
            code = code.replace(&param.placeholder(), &render_value(value));
            resolved.insert(param.name.clone(), value.clone());
        }

        if let Some(customization) = &request.customization {
            code = self.profile.apply_customization(code, customization);
        }

        let validation = validator.validate_code(engine, template.language, &code);
        let stem = resolved
            .get("className")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.profile.default_file_stem());

        tracing::debug!(
            engine = %engine,
            template_id = %template.id,
            valid = validation.valid,
            "Generated code from template"
        );

        Ok(GeneratedCode {
            engine,
            language: template.language,
            filename: format!("{}.{}", stem, template.language.extension()),
            code,
            validation,
            metadata: GenerationMetadata {
                generated_at: Utc::now(),
                template_id: template.id.clone(),
                category: template.category.clone(),
                parameters: resolved,
            },
        })
    }

    /// First registered template with the category
    pub fn find_template(&self, category: &str) -> Option<&CodeTemplate> {
        self.templates.iter().find(|t| t.category == category)
    }

    /// Register a template, replacing any template with the same id
    pub fn add_template(&mut self, template: CodeTemplate) -> Result<(), TemplateError> {
        if template.engine != self.engine() {
            return Err(TemplateError::EngineMismatch {
                expected: self.engine(),
                actual: template.engine,
            });
        }
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
        Ok(())
    }

    pub fn get_template(&self, id: &str) -> Option<&CodeTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all_templates(&self) -> &[CodeTemplate] {
        &self.templates
    }
}

/// Null and empty strings count as "not supplied"
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Loose truthiness for customization flags
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
