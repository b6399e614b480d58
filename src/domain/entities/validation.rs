//! Validation entities - Lint rules and their findings

use serde::{Deserialize, Serialize};

use super::code_template::{CodeLanguage, GameEngine};

/// A data-driven lint rule: a pattern each line (or the file) is expected to satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub id: String,
    pub engine: GameEngine,
    pub language: CodeLanguage,
    pub name: String,
    pub description: String,
    /// Regular expression the checked text must match
    pub pattern: String,
    pub severity: Severity,
    pub category: RuleCategory,
    #[serde(default)]
    pub scope: RuleScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    Syntax,
    Style,
    Performance,
    Security,
    BestPractice,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Style => "style",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::BestPractice => "best-practice",
        }
    }
}

/// Where a rule is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Every line that does not match produces a finding
    #[default]
    PerLine,
    /// One finding at line 1 when no line matches
    File,
}

/// One validator output item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: String,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    /// Offending source line (errors only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub suggestions: Vec<Finding>,
}

impl ValidationResult {
    /// Route findings into buckets by severity; validity depends on errors only
    pub fn from_findings(findings: impl IntoIterator<Item = Finding>) -> Self {
        let mut result = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => result.errors.push(finding),
                Severity::Warning => result.warnings.push(finding),
                Severity::Info => result.suggestions.push(finding),
            }
        }
        result.valid = result.errors.is_empty();
        result
    }

    pub fn finding_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.suggestions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding {
            rule: "r".to_string(),
            message: "m".to_string(),
            line: 1,
            column: 1,
            severity,
            code: None,
            suggestion: None,
            improvement: None,
        }
    }

    #[test]
    fn test_warnings_do_not_affect_validity() {
        let result = ValidationResult::from_findings(vec![
            finding(Severity::Warning),
            finding(Severity::Info),
            finding(Severity::Info),
        ]);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.suggestions.len(), 2);
    }

    #[test]
    fn test_single_error_invalidates() {
        let result = ValidationResult::from_findings(vec![finding(Severity::Error)]);
        assert!(!result.valid);
        assert_eq!(result.finding_count(), 1);
    }

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_value(RuleCategory::BestPractice).unwrap();
        assert_eq!(json, "best-practice");
        assert_eq!(RuleCategory::BestPractice.as_str(), "best-practice");
    }
}
