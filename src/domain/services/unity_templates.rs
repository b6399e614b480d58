//! Unity C# templates and customization

use serde_json::{Map, Value};

use super::template_engine::EngineProfile;
use crate::domain::entities::{CodeLanguage, CodeTemplate, GameEngine, TemplateParameter};

pub struct UnityProfile;

impl EngineProfile for UnityProfile {
    fn engine(&self) -> GameEngine {
        GameEngine::Unity
    }

    fn builtin_templates(&self) -> Vec<CodeTemplate> {
        vec![
            template(
                "basic_monobehaviour",
                "component",
                "Basic MonoBehaviour",
                "Basic Unity MonoBehaviour script template",
                MONOBEHAVIOUR,
                vec![
                    TemplateParameter::required("className", "Name of the component class"),
                    TemplateParameter::optional(
                        "startContent",
                        "Code to run in Start method",
                        "// Initialize your component here",
                    ),
                    TemplateParameter::optional(
                        "updateContent",
                        "Code to run in Update method",
                        "// Update logic goes here",
                    ),
                ],
            ),
            template(
                "scriptable_object",
                "data",
                "ScriptableObject",
                "Template for creating ScriptableObject data containers",
                SCRIPTABLE_OBJECT,
                vec![
                    TemplateParameter::required("className", "Name of the ScriptableObject class"),
                    TemplateParameter::required("fileName", "Default file name for the asset"),
                    TemplateParameter::required("menuPath", "Asset menu path"),
                    TemplateParameter::optional(
                        "properties",
                        "Property definitions",
                        "// Add your properties here",
                    ),
                ],
            ),
            template(
                "custom_editor",
                "editor",
                "Custom Editor",
                "Template for creating custom Unity editors",
                CUSTOM_EDITOR,
                vec![
                    TemplateParameter::required("className", "Name of the editor class"),
                    TemplateParameter::required("targetClass", "Name of the class being edited"),
                    TemplateParameter::optional(
                        "inspectorContent",
                        "Custom inspector GUI code",
                        "// Add your custom inspector GUI here",
                    ),
                ],
            ),
        ]
    }

    /// `namespace` wraps the file; `using` (string or list) prepends directives
    fn apply_customization(&self, mut code: String, customization: &Map<String, Value>) -> String {
        if let Some(namespace) = customization.get("namespace").and_then(non_empty_str) {
            code = format!("namespace {}\n{{\n{}\n}}", namespace, code);
        }

        let usings: Vec<String> = match customization.get("using") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Some(value) => non_empty_str(value).map(|s| vec![s.to_string()]).unwrap_or_default(),
            None => Vec::new(),
        };
        if !usings.is_empty() {
            let directives: String = usings.iter().map(|u| format!("using {};\n", u)).collect();
            code = format!("{}\n{}", directives, code);
        }

        code
    }

    fn default_file_stem(&self) -> &'static str {
        "GeneratedScript"
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
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
        engine: GameEngine::Unity,
        language: CodeLanguage::Csharp,
        category: category.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        code: code.to_string(),
        parameters,
    }
}

const MONOBEHAVIOUR: &str = "using UnityEngine;

public class {{className}} : MonoBehaviour
{
    // Start is called before the first frame update
    void Start()
    {
        {{startContent}}
    }

    // Update is called once per frame
    void Update()
    {
        {{updateContent}}
    }
}";

const SCRIPTABLE_OBJECT: &str = "using UnityEngine;

[CreateAssetMenu(fileName = \"{{fileName}}\", menuName = \"{{menuPath}}\")]
public class {{className}} : ScriptableObject
{
    {{properties}}
}";

const CUSTOM_EDITOR: &str = "using UnityEngine;
using UnityEditor;

[CustomEditor(typeof({{targetClass}}))]
public class {{className}} : Editor
{
    public override void OnInspectorGUI()
    {
        {{targetClass}} target = ({{targetClass}})target;

        EditorGUI.BeginChangeCheck();

        {{inspectorContent}}

        if (EditorGUI.EndChangeCheck())
        {
            serializedObject.ApplyModifiedProperties();
        }
    }
}";
