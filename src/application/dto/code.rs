//! Code synthesis DTOs - Request bodies for template generation and validation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::services::{parse_engine, CodeGenerationRequest, TemplateError};

/// Code generation body; the engine stays a string until checked
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCodeBody {
    pub engine: String,
    pub category: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub customization: Option<Map<String, Value>>,
}

impl TryFrom<GenerateCodeBody> for CodeGenerationRequest {
    type Error = TemplateError;

    fn try_from(body: GenerateCodeBody) -> Result<Self, Self::Error> {
        Ok(CodeGenerationRequest {
            engine: parse_engine(&body.engine)?,
            category: body.category,
            parameters: body.parameters,
            customization: body.customization,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateCodeBody {
    pub engine: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelGenerationBody {
    pub generation_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelGenerationResponse {
    pub generation_id: String,
    /// Whether the job was still running when the request arrived
    pub was_active: bool,
}
