//! Code template entities - Parameterized engine source templates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target game engine for generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameEngine {
    Unity,
    Godot,
}

impl GameEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unity => "unity",
            Self::Godot => "godot",
        }
    }

    /// The only language each engine is generated in
    pub fn language(&self) -> CodeLanguage {
        match self {
            Self::Unity => CodeLanguage::Csharp,
            Self::Godot => CodeLanguage::Gdscript,
        }
    }
}

impl fmt::Display for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unity" => Ok(Self::Unity),
            "godot" => Ok(Self::Godot),
            other => Err(format!("Unsupported engine: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Csharp,
    Gdscript,
}

impl CodeLanguage {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csharp => "cs",
            Self::Gdscript => "gd",
        }
    }
}

/// A named, parameterized source template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeTemplate {
    pub id: String,
    pub engine: GameEngine,
    pub language: CodeLanguage,
    /// Lookup key used by code generation requests
    pub category: String,
    pub name: String,
    pub description: String,
    /// Body with `{{name}}` placeholders
    pub code: String,
    pub parameters: Vec<TemplateParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl TemplateParameter {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterType::String,
            description: description.to_string(),
            required: true,
            default_value: None,
        }
    }

    pub fn optional(name: &str, description: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterType::String,
            description: description.to_string(),
            required: false,
            default_value: Some(serde_json::Value::String(default.to_string())),
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default_value = Some(serde_json::Value::String(default.to_string()));
        self
    }

    /// Placeholder token for this parameter in a template body
    pub fn placeholder(&self) -> String {
        format!("{{{{{}}}}}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}
