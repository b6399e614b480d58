//! Godot GDScript templates and customization

use serde_json::{Map, Value};

use super::template_engine::{is_truthy, EngineProfile};
use crate::domain::entities::{CodeLanguage, CodeTemplate, GameEngine, TemplateParameter};

pub struct GodotProfile;

impl EngineProfile for GodotProfile {
    fn engine(&self) -> GameEngine {
        GameEngine::Godot
    }

    fn builtin_templates(&self) -> Vec<CodeTemplate> {
        vec![
            template(
                "basic_node",
                "node",
                "Basic Node",
                "Basic Godot node script template",
                BASIC_NODE,
                vec![
                    TemplateParameter::required("baseClass", "Base class to extend from")
                        .with_default("Node"),
                    TemplateParameter::optional("signals", "Signal declarations", "# Define signals here"),
                    TemplateParameter::optional(
                        "variables",
                        "Variable declarations",
                        "# Define variables here",
                    ),
                    TemplateParameter::optional(
                        "readyContent",
                        "Code to run in _ready",
                        "pass # Replace with function body",
                    ),
                    TemplateParameter::optional(
                        "processContent",
                        "Code to run in _process",
                        "pass # Replace with function body",
                    ),
                ],
            ),
            template(
                "custom_resource",
                "resource",
                "Custom Resource",
                "Template for creating custom Godot resources",
                CUSTOM_RESOURCE,
                vec![
                    TemplateParameter::required("className", "Name of the resource class"),
                    TemplateParameter::optional(
                        "properties",
                        "Property declarations",
                        "# Define properties here",
                    ),
                    TemplateParameter::optional("initParams", "Constructor parameters", ""),
                    TemplateParameter::optional(
                        "initContent",
                        "Constructor initialization code",
                        "pass # Replace with initialization code",
                    ),
                ],
            ),
            template(
                "state_machine",
                "pattern",
                "State Machine",
                "Template for creating a state machine pattern",
                STATE_MACHINE,
                vec![
                    TemplateParameter::required("className", "Name of the state machine class"),
                    TemplateParameter::optional(
                        "initStates",
                        "State initialization code",
                        "# Initialize your states here",
                    ),
                ],
            ),
        ]
    }

    /// `tool` marks the script `@tool`; `iconPath` adds an `@icon` annotation above it
    fn apply_customization(&self, mut code: String, customization: &Map<String, Value>) -> String {
        if is_truthy(customization.get("tool")) {
            code = format!("@tool\n{}", code);
        }
        if is_truthy(customization.get("iconPath")) {
            let icon = match customization.get("iconPath") {
                Some(Value::String(path)) => path.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            code = format!("@icon(\"{}\")\n{}", icon, code);
        }
        code
    }

    fn default_file_stem(&self) -> &'static str {
        "generated_script"
    }
}

fn template(
    id: &str,
    category: &str,
    name: &str,
    description: &str,
    code: &str,
    parameters: Vec<TemplateParameter>,
) -> CodeTemplate {
    CodeTemplate {
        id: id.to_string(),
        engine: GameEngine::Godot,
        language: CodeLanguage::Gdscript,
        category: category.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        code: code.to_string(),
        parameters,
    }
}

const BASIC_NODE: &str = "extends {{baseClass}}

{{signals}}

{{variables}}

# Called when the node enters the scene tree for the first time.
func _ready():
    {{readyContent}}

# Called every frame. 'delta' is the elapsed time since the previous frame.
func _process(delta):
    {{processContent}}";

const CUSTOM_RESOURCE: &str = "extends Resource
class_name {{className}}

{{properties}}

func _init({{initParams}}):
    {{initContent}}";

const STATE_MACHINE: &str = "extends Node
class_name {{className}}

var current_state = null
var states = {}

func _ready():
    {{initStates}}

    if states.size() > 0:
        current_state = states.values()[0]
        current_state.enter()

func _process(delta):
    if current_state != null:
        current_state.update(delta)

func add_state(state_name: String, state_node: Node) -> void:
    states[state_name] = state_node

func change_state(new_state: String) -> void:
    if current_state != null:
        current_state.exit()

    if states.has(new_state):
        current_state = states[new_state]
        current_state.enter()";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::code_validator::CodeValidator;
    use crate::domain::services::template_engine::{
        CodeGenerationRequest, TemplateEngine, TemplateError,
    };
    use serde_json::json;

    fn engine() -> TemplateEngine {
        TemplateEngine::new(Box::new(GodotProfile))
    }

    #[test]
    fn test_node_uses_required_default() {
        let validator = CodeValidator::new();
        let request = CodeGenerationRequest::new(GameEngine::Godot, "node");
        let generated = engine().generate_code(&request, &validator).unwrap();

        assert!(generated.code.starts_with("extends Node\n"));
        assert_eq!(generated.filename, "generated_script.gd");
        assert_eq!(generated.language, CodeLanguage::Gdscript);
        assert!(!generated.code.contains("{{"));
    }

    #[test]
    fn test_every_template_resolves_all_placeholders() {
        let validator = CodeValidator::new();
        let engine = engine();
        for template in engine.all_templates() {
            let mut request = CodeGenerationRequest::new(GameEngine::Godot, template.category.clone());
            for param in template.parameters.iter().filter(|p| p.required) {
                request = request.param(&param.name, format!("{}Value", param.name));
            }
            let generated = engine.generate_code(&request, &validator).unwrap();
            assert!(!generated.code.contains("{{"), "unresolved placeholder in {}", template.id);
        }
    }

    #[test]
    fn test_resource_with_empty_default() {
        let validator = CodeValidator::new();
        let request = CodeGenerationRequest::new(GameEngine::Godot, "resource").param("className", "QuestLog");
        let generated = engine().generate_code(&request, &validator).unwrap();

        assert!(generated.code.contains("class_name QuestLog"));
        assert!(generated.code.contains("func _init():"));
        assert_eq!(generated.filename, "QuestLog.gd");
    }

    #[test]
    fn test_missing_class_name() {
        let validator = CodeValidator::new();
        let request = CodeGenerationRequest::new(GameEngine::Godot, "pattern");
        assert_eq!(
            engine().generate_code(&request, &validator).unwrap_err(),
            TemplateError::MissingRequiredParameter("className".to_string())
        );
    }

    #[test]
    fn test_tool_and_icon_customization() {
        let validator = CodeValidator::new();
        let request = CodeGenerationRequest::new(GameEngine::Godot, "node")
            .param("baseClass", "Node2D")
            .customize("tool", true)
            .customize("iconPath", "res://icon.svg");
        let generated = engine().generate_code(&request, &validator).unwrap();

        assert!(generated
            .code
            .starts_with("@icon(\"res://icon.svg\")\n@tool\nextends Node2D"));
    }

    #[test]
    fn test_false_tool_flag_is_ignored() {
        let customization = json!({ "tool": false });
        let code = GodotProfile.apply_customization(
            "extends Node".to_string(),
            customization.as_object().unwrap(),
        );
        assert_eq!(code, "extends Node");
    }

    #[test]
    fn test_generated_node_is_validated() {
        let validator = CodeValidator::new();
        let request = CodeGenerationRequest::new(GameEngine::Godot, "node")
            .param("signals", "signal health_changed");
        let generated = engine().generate_code(&request, &validator).unwrap();

        // Per-line rules flag every line without `extends` or a signal declaration
        assert!(!generated.validation.valid);
        assert!(generated
            .validation
            .errors
            .iter()
            .all(|f| f.rule == "godot_extends" || f.rule == "godot_signal_declaration"));
        assert!(!generated.validation.suggestions.iter().any(|f| f.rule == "godot_lifecycle"));
    }
}
