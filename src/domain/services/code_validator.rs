//! Code validator - Regex lint rules plus engine heuristics over generated source
//!
//! Rules are plain data. A per-line rule is checked against every line of
//! the file and fires on each line it does not match, so long files
//! accumulate many findings from a single rule. File-scoped rules fire once
//! when no line matches.

use regex::Regex;

use crate::domain::entities::{
    CodeLanguage, Finding, GameEngine, RuleCategory, RuleScope, Severity, ValidationResult,
    ValidationRule,
};

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid pattern for rule {id}: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ValidationRule,
    matcher: Regex,
}

/// Registry of validation rules keyed by id, in registration order
#[derive(Debug, Clone)]
pub struct CodeValidator {
    rules: Vec<CompiledRule>,
}

impl Default for CodeValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeValidator {
    /// Validator seeded with the Unity C# and Godot GDScript rule sets
    pub fn new() -> Self {
        let mut validator = Self::empty();
        for rule in default_rules() {
            if let Err(e) = validator.add_rule(rule) {
                tracing::error!("Skipping built-in validation rule: {}", e);
            }
        }
        validator
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule, replacing any rule with the same id
    pub fn add_rule(&mut self, rule: ValidationRule) -> Result<(), RuleError> {
        let matcher = Regex::new(&rule.pattern).map_err(|source| RuleError::InvalidPattern {
            id: rule.id.clone(),
            source,
        })?;
        let compiled = CompiledRule { rule, matcher };

        match self.rules.iter_mut().find(|r| r.rule.id == compiled.rule.id) {
            Some(existing) => *existing = compiled,
            None => self.rules.push(compiled),
        }
        Ok(())
    }

    pub fn get_rule(&self, id: &str) -> Option<&ValidationRule> {
        self.rules.iter().map(|r| &r.rule).find(|r| r.id == id)
    }

    pub fn all_rules(&self) -> Vec<&ValidationRule> {
        self.rules.iter().map(|r| &r.rule).collect()
    }

    pub fn rules_for(&self, engine: GameEngine, language: CodeLanguage) -> Vec<&ValidationRule> {
        self.compiled_for(engine, language).map(|r| &r.rule).collect()
    }

    fn compiled_for(
        &self,
        engine: GameEngine,
        language: CodeLanguage,
    ) -> impl Iterator<Item = &CompiledRule> {
        self.rules
            .iter()
            .filter(move |r| r.rule.engine == engine && r.rule.language == language)
    }

    pub fn validate_code(
        &self,
        engine: GameEngine,
        language: CodeLanguage,
        code: &str,
    ) -> ValidationResult {
        let lines: Vec<&str> = code.split('\n').collect();
        let (per_line, per_file): (Vec<&CompiledRule>, Vec<&CompiledRule>) = self
            .compiled_for(engine, language)
            .partition(|r| r.rule.scope == RuleScope::PerLine);

        let mut findings = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            for compiled in &per_line {
                if !compiled.matcher.is_match(line) {
                    findings.push(rule_finding(&compiled.rule, index + 1, line));
                }
            }
        }
        for compiled in per_file {
            if !lines.iter().any(|line| compiled.matcher.is_match(line)) {
                findings.push(rule_finding(&compiled.rule, 1, lines.first().copied().unwrap_or("")));
            }
        }
        findings.extend(engine_heuristics(engine, code));

        ValidationResult::from_findings(findings)
    }
}

fn rule_finding(rule: &ValidationRule, line_number: usize, line: &str) -> Finding {
    let mut finding = Finding {
        rule: rule.id.clone(),
        message: rule.description.clone(),
        line: line_number,
        column: 1,
        severity: rule.severity,
        code: None,
        suggestion: None,
        improvement: None,
    };
    match rule.severity {
        Severity::Error => finding.code = Some(line.to_string()),
        Severity::Warning => finding.suggestion = Some(suggestion_for(rule)),
        Severity::Info => finding.improvement = Some(suggestion_for(rule)),
    }
    finding
}

fn suggestion_for(rule: &ValidationRule) -> String {
    match rule.id.as_str() {
        "unity_method_naming" => "Use PascalCase for method names and ensure they follow Unity lifecycle naming conventions".to_string(),
        "godot_method_naming" => "Use snake_case for method names and ensure they follow Godot naming conventions".to_string(),
        _ => format!("Consider following the {} guidelines", rule.category.as_str()),
    }
}

/// Whole-file checks that run once per validation
fn engine_heuristics(engine: GameEngine, code: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    match engine {
        GameEngine::Unity => {
            if !code.contains("void Start()") && !code.contains("void Awake()") {
                findings.push(heuristic(
                    "unity_lifecycle",
                    Severity::Info,
                    "Consider implementing Start or Awake for initialization",
                    "Add void Start() or void Awake() method for initialization logic",
                ));
            }
            if code.contains("GetComponent") && !code.contains("void OnDestroy()") {
                findings.push(heuristic(
                    "unity_cleanup",
                    Severity::Warning,
                    "GetComponent usage detected without cleanup",
                    "Consider implementing OnDestroy to clean up references",
                ));
            }
        }
        GameEngine::Godot => {
            if !code.contains("func _ready()") {
                findings.push(heuristic(
                    "godot_lifecycle",
                    Severity::Info,
                    "Consider implementing _ready for initialization",
                    "Add func _ready() for initialization logic",
                ));
            }
            if code.contains("connect(") && !code.contains("func _exit_tree()") {
                findings.push(heuristic(
                    "godot_cleanup",
                    Severity::Warning,
                    "Signal connection detected without cleanup",
                    "Consider implementing _exit_tree to disconnect signals",
                ));
            }
        }
    }
    findings
}

fn heuristic(rule: &str, severity: Severity, message: &str, advice: &str) -> Finding {
    let (suggestion, improvement) = match severity {
        Severity::Info => (None, Some(advice.to_string())),
        _ => (Some(advice.to_string()), None),
    };
    Finding {
        rule: rule.to_string(),
        message: message.to_string(),
        line: 1,
        column: 1,
        severity,
        code: None,
        suggestion,
        improvement,
    }
}

fn rule(
    id: &str,
    engine: GameEngine,
    name: &str,
    description: &str,
    pattern: &str,
    severity: Severity,
    category: RuleCategory,
) -> ValidationRule {
    ValidationRule {
        id: id.to_string(),
        engine,
        language: engine.language(),
        name: name.to_string(),
        description: description.to_string(),
        pattern: pattern.to_string(),
        severity,
        category,
        scope: RuleScope::PerLine,
    }
}

fn default_rules() -> Vec<ValidationRule> {
    vec![
        rule(
            "unity_namespace",
            GameEngine::Unity,
            "Unity Namespace",
            "Check if Unity namespace is imported",
            r"^using\s+UnityEngine;",
            Severity::Error,
            RuleCategory::Syntax,
        ),
        rule(
            "unity_class_inheritance",
            GameEngine::Unity,
            "Unity Class Inheritance",
            "Check if class inherits from Unity base class",
            r"class\s+\w+\s*:\s*(MonoBehaviour|ScriptableObject|Editor)",
            Severity::Error,
            RuleCategory::Syntax,
        ),
        rule(
            "unity_method_naming",
            GameEngine::Unity,
            "Unity Method Naming",
            "Check Unity method naming conventions",
            r"(Start|Update|Awake|FixedUpdate|LateUpdate|OnEnable|OnDisable)\s*\(",
            Severity::Warning,
            RuleCategory::Style,
        ),
        rule(
            "godot_extends",
            GameEngine::Godot,
            "Godot Extends",
            "Check if script extends from a base class",
            r"^extends\s+\w+",
            Severity::Error,
            RuleCategory::Syntax,
        ),
        rule(
            "godot_method_naming",
            GameEngine::Godot,
            "Godot Method Naming",
            "Check Godot method naming conventions",
            r"(_ready|_process|_physics_process|_input|_unhandled_input)\s*\(",
            Severity::Warning,
            RuleCategory::Style,
        ),
        rule(
            "godot_signal_declaration",
            GameEngine::Godot,
            "Godot Signal Declaration",
            "Check signal declaration syntax",
            r"signal\s+\w+",
            Severity::Error,
            RuleCategory::Syntax,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_unity(validator: &CodeValidator, code: &str) -> ValidationResult {
        validator.validate_code(GameEngine::Unity, CodeLanguage::Csharp, code)
    }

    #[test]
    fn test_seeded_rules() {
        let validator = CodeValidator::new();
        assert_eq!(validator.all_rules().len(), 6);
        assert_eq!(validator.rules_for(GameEngine::Unity, CodeLanguage::Csharp).len(), 3);
        assert_eq!(validator.rules_for(GameEngine::Godot, CodeLanguage::Gdscript).len(), 3);
        assert!(validator.rules_for(GameEngine::Godot, CodeLanguage::Csharp).is_empty());
        assert_eq!(
            validator.get_rule("godot_extends").map(|r| r.severity),
            Some(Severity::Error)
        );
    }

    #[test]
    fn test_rules_fire_per_non_matching_line() {
        let validator = CodeValidator::new();
        let result = validate_unity(&validator, "using UnityEngine;");

        // One line: the namespace rule matches, the other two rules fire once
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].rule, "unity_class_inheritance");
        assert_eq!(result.errors[0].code.as_deref(), Some("using UnityEngine;"));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0]
            .suggestion
            .as_deref()
            .is_some_and(|s| s.starts_with("Use PascalCase")));
        assert!(!result.valid);
    }

    #[test]
    fn test_per_line_policy_scales_with_line_count() {
        let validator = CodeValidator::new();
        let code = "using UnityEngine;\n\npublic class Mover : MonoBehaviour\n{\n}";
        let result = validate_unity(&validator, code);

        let namespace_lines: Vec<usize> = result
            .errors
            .iter()
            .filter(|f| f.rule == "unity_namespace")
            .map(|f| f.line)
            .collect();
        // The import exists on line 1, yet every other line is still flagged
        assert_eq!(namespace_lines, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_file_scope_fires_once() {
        let mut validator = CodeValidator::empty();
        let mut extends = rule(
            "extends_anywhere",
            GameEngine::Godot,
            "Extends",
            "Script must extend a class",
            r"^extends\s+\w+",
            Severity::Error,
            RuleCategory::Syntax,
        );
        extends.scope = RuleScope::File;
        validator.add_rule(extends).unwrap();

        let ok = validator.validate_code(
            GameEngine::Godot,
            CodeLanguage::Gdscript,
            "extends Node\n\nfunc _ready():\n    pass",
        );
        assert!(ok.valid);

        let missing = validator.validate_code(
            GameEngine::Godot,
            CodeLanguage::Gdscript,
            "var a = 1\nvar b = 2\nfunc _ready():\n    pass",
        );
        assert_eq!(missing.errors.len(), 1);
        assert_eq!(missing.errors[0].line, 1);
    }

    #[test]
    fn test_severity_routing_and_validity() {
        let mut validator = CodeValidator::empty();
        validator
            .add_rule(rule(
                "note_todo",
                GameEngine::Godot,
                "Todo",
                "Lines should mention TODO",
                "TODO",
                Severity::Info,
                RuleCategory::BestPractice,
            ))
            .unwrap();
        let result = validator.validate_code(
            GameEngine::Godot,
            CodeLanguage::Gdscript,
            "func _ready():\n    pass",
        );

        assert!(result.valid);
        assert_eq!(result.suggestions.len(), 2);
        assert_eq!(
            result.suggestions[0].improvement.as_deref(),
            Some("Consider following the best-practice guidelines")
        );
    }

    #[test]
    fn test_unity_heuristics() {
        let validator = CodeValidator::new();
        let result = validate_unity(&validator, "var body = GetComponent<Rigidbody>();");

        assert!(result.suggestions.iter().any(|f| f.rule == "unity_lifecycle"));
        assert!(result.warnings.iter().any(|f| f.rule == "unity_cleanup"));

        let with_teardown = validate_unity(
            &validator,
            "void Awake() { GetComponent<Rigidbody>(); }\nvoid OnDestroy() { }",
        );
        assert!(!with_teardown.suggestions.iter().any(|f| f.rule == "unity_lifecycle"));
        assert!(!with_teardown.warnings.iter().any(|f| f.rule == "unity_cleanup"));
    }

    #[test]
    fn test_godot_heuristics() {
        let validator = CodeValidator::new();
        let result = validator.validate_code(
            GameEngine::Godot,
            CodeLanguage::Gdscript,
            "extends Node\nfunc _enter_tree():\n    body.connect(\"hit\", self, \"_on_hit\")",
        );

        assert!(result.suggestions.iter().any(|f| f.rule == "godot_lifecycle"));
        assert!(result.warnings.iter().any(|f| f.rule == "godot_cleanup"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut validator = CodeValidator::empty();
        let broken = rule(
            "broken",
            GameEngine::Unity,
            "Broken",
            "Unbalanced group",
            "(unclosed",
            Severity::Error,
            RuleCategory::Syntax,
        );
        assert!(matches!(
            validator.add_rule(broken),
            Err(RuleError::InvalidPattern { .. })
        ));
        assert!(validator.all_rules().is_empty());
    }

    #[test]
    fn test_add_rule_replaces_by_id() {
        let mut validator = CodeValidator::new();
        let mut relaxed = validator.get_rule("unity_namespace").cloned().unwrap();
        relaxed.severity = Severity::Info;
        validator.add_rule(relaxed).unwrap();

        assert_eq!(validator.all_rules().len(), 6);
        assert_eq!(
            validator.get_rule("unity_namespace").map(|r| r.severity),
            Some(Severity::Info)
        );
    }
}
