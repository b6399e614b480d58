//! Code synthesis service - Dispatches code generation to the engine's template catalog

use super::code_validator::{CodeValidator, RuleError};
use super::godot_templates::GodotProfile;
use super::template_engine::{CodeGenerationRequest, GeneratedCode, TemplateEngine, TemplateError};
use super::unity_templates::UnityProfile;
use crate::domain::entities::{CodeTemplate, GameEngine, ValidationResult, ValidationRule};

/// Parse a client-supplied engine name, rejecting anything but unity/godot
pub fn parse_engine(name: &str) -> Result<GameEngine, TemplateError> {
    name.parse()
        .map_err(|_| TemplateError::UnsupportedEngine(name.to_string()))
}

/// Template engines for every supported game engine, sharing one validator
#[derive(Debug)]
pub struct CodeSynthesisService {
    validator: CodeValidator,
    unity: TemplateEngine,
    godot: TemplateEngine,
}

impl Default for CodeSynthesisService {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeSynthesisService {
    pub fn new() -> Self {
        Self {
            validator: CodeValidator::new(),
            unity: TemplateEngine::new(Box::new(UnityProfile)),
            godot: TemplateEngine::new(Box::new(GodotProfile)),
        }
    }

    fn engine(&self, engine: GameEngine) -> &TemplateEngine {
        match engine {
            GameEngine::Unity => &self.unity,
            GameEngine::Godot => &self.godot,
        }
    }

    fn engine_mut(&mut self, engine: GameEngine) -> &mut TemplateEngine {
        match engine {
            GameEngine::Unity => &mut self.unity,
            GameEngine::Godot => &mut self.godot,
        }
    }

    #[tracing::instrument(skip(self, request), fields(engine = %request.engine, category = %request.category))]
    pub fn generate_code(&self, request: &CodeGenerationRequest) -> Result<GeneratedCode, TemplateError> {
        self.engine(request.engine).generate_code(request, &self.validator)
    }

    pub fn templates(&self, engine: GameEngine) -> &[CodeTemplate] {
        self.engine(engine).all_templates()
    }

    pub fn get_template(&self, engine: GameEngine, id: &str) -> Option<&CodeTemplate> {
        self.engine(engine).get_template(id)
    }

    pub fn add_template(&mut self, template: CodeTemplate) -> Result<(), TemplateError> {
        tracing::info!(engine = %template.engine, template_id = %template.id, "Registering template");
        self.engine_mut(template.engine).add_template(template)
    }

    /// Lint source text with the engine's rule set
    pub fn validate(&self, engine: GameEngine, code: &str) -> ValidationResult {
        self.validator.validate_code(engine, engine.language(), code)
    }

    pub fn rules(&self, engine: GameEngine) -> Vec<&ValidationRule> {
        self.validator.rules_for(engine, engine.language())
    }

    pub fn add_rule(&mut self, rule: ValidationRule) -> Result<(), RuleError> {
        self.validator.add_rule(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RuleCategory, RuleScope, Severity};

    #[test]
    fn test_parse_engine_rejects_unknown() {
        assert_eq!(parse_engine("godot"), Ok(GameEngine::Godot));
        assert_eq!(
            parse_engine("unreal"),
            Err(TemplateError::UnsupportedEngine("unreal".to_string()))
        );
    }

    #[test]
    fn test_dispatch_by_engine() {
        let service = CodeSynthesisService::new();
        let unity = service
            .generate_code(&CodeGenerationRequest::new(GameEngine::Unity, "component").param("className", "A"))
            .unwrap();
        let godot = service
            .generate_code(&CodeGenerationRequest::new(GameEngine::Godot, "node"))
            .unwrap();

        assert!(unity.filename.ends_with(".cs"));
        assert!(godot.filename.ends_with(".gd"));
        assert!(service.generate_code(&CodeGenerationRequest::new(GameEngine::Godot, "component")).is_err());
    }

    #[test]
    fn test_template_catalog_per_engine() {
        let mut service = CodeSynthesisService::new();
        assert_eq!(service.templates(GameEngine::Unity).len(), 3);
        assert!(service.get_template(GameEngine::Godot, "state_machine").is_some());
        assert!(service.get_template(GameEngine::Unity, "state_machine").is_none());

        let mut replacement = service.get_template(GameEngine::Godot, "basic_node").cloned().unwrap();
        replacement.name = "Renamed".to_string();
        service.add_template(replacement).unwrap();
        assert_eq!(service.templates(GameEngine::Godot).len(), 3);
        assert_eq!(
            service.get_template(GameEngine::Godot, "basic_node").map(|t| t.name.as_str()),
            Some("Renamed")
        );
    }

    #[test]
    fn test_added_rule_applies_to_generation() {
        let mut service = CodeSynthesisService::new();
        service
            .add_rule(ValidationRule {
                id: "no_tabs".to_string(),
                engine: GameEngine::Unity,
                language: GameEngine::Unity.language(),
                name: "No tabs".to_string(),
                description: "Lines must not start with a tab".to_string(),
                pattern: r"^[^\t]*$".to_string(),
                severity: Severity::Warning,
                category: RuleCategory::Style,
                scope: RuleScope::PerLine,
            })
            .unwrap();

        assert_eq!(service.rules(GameEngine::Unity).len(), 4);
        let result = service.validate(GameEngine::Unity, "\tusing UnityEngine;");
        assert!(result.warnings.iter().any(|f| f.rule == "no_tabs"));
    }
}
