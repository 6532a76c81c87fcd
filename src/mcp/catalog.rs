use crate::constants::pagination;
use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Declared parameter of a catalog tool. The JSON Schema served through
/// `tools/list` and the validator run on every call are both generated
/// from these entries.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
}

impl ParameterSpec {
    fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            required: true,
            default: None,
            description,
        }
    }

    fn optional_string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            required: false,
            default: None,
            description,
        }
    }

    fn integer(name: &'static str, default: i64, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Integer,
            required: false,
            default: Some(json!(default)),
            description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParameterSpec>,
    pub input_schema: Value,
}

impl ToolSpec {
    fn new(name: &'static str, description: &'static str, params: Vec<ParameterSpec>) -> Self {
        let input_schema = build_input_schema(&params);
        Self {
            name,
            description,
            params,
            input_schema,
        }
    }
}

/// Wire form of a catalog entry for `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolSpec>> = Lazy::new(|| {
    vec![
        ToolSpec::new(
            "search_contracts",
            "Search for public contracts in the SICAP database.",
            vec![
                ParameterSpec::string("query", "Search query string to find contracts"),
                ParameterSpec::integer(
                    "limit",
                    pagination::DEFAULT_LIMIT,
                    "Maximum number of results to return",
                ),
                ParameterSpec::integer(
                    "offset",
                    pagination::DEFAULT_OFFSET,
                    "Offset for pagination",
                ),
            ],
        ),
        ToolSpec::new(
            "get_contract_details",
            "Get detailed information about a specific contract.",
            vec![ParameterSpec::string(
                "contract_id",
                "The unique identifier of the contract",
            )],
        ),
        ToolSpec::new(
            "get_organizations",
            "Get information about organizations in the SICAP database.",
            vec![
                ParameterSpec::optional_string("name", "Optional organization name to filter by"),
                ParameterSpec::integer(
                    "limit",
                    pagination::DEFAULT_LIMIT,
                    "Maximum number of results to return",
                ),
                ParameterSpec::integer(
                    "offset",
                    pagination::DEFAULT_OFFSET,
                    "Offset for pagination",
                ),
            ],
        ),
        ToolSpec::new(
            "get_statistics",
            "Get statistical information about contracts in the SICAP database.",
            vec![ParameterSpec::optional_string(
                "period",
                "Optional time period for statistics, e.g. 'monthly' or 'yearly'",
            )],
        ),
    ]
});

static TOOL_MAP: Lazy<HashMap<&'static str, &'static ToolSpec>> =
    Lazy::new(|| TOOL_CATALOG.iter().map(|tool| (tool.name, tool)).collect());

static TOOL_VALIDATORS: Lazy<HashMap<&'static str, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name, schema);
        }
    }
    map
});

fn build_input_schema(params: &[ParameterSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in params {
        let type_name = match param.kind {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
        };
        let mut property = Map::new();
        property.insert("type".to_string(), json!(type_name));
        property.insert("description".to_string(), json!(param.description));
        if let Some(default) = &param.default {
            property.insert("default".to_string(), default.clone());
        }
        properties.insert(param.name.to_string(), Value::Object(property));
        if param.required {
            required.push(param.name);
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

pub fn tool_catalog() -> &'static [ToolSpec] {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolSpec> {
    TOOL_MAP.get(name).copied()
}

pub fn tool_names() -> Vec<String> {
    TOOL_CATALOG
        .iter()
        .map(|tool| tool.name.to_string())
        .collect()
}

pub fn tool_definitions() -> Vec<ToolDef> {
    TOOL_CATALOG
        .iter()
        .map(|tool| ToolDef {
            name: tool.name,
            description: tool.description,
            input_schema: tool.input_schema.clone(),
        })
        .collect()
}

/// Validates call arguments against the tool's generated schema. Runs
/// before any request is built, so a rejection costs no network call.
pub fn validate_tool_args(tool: &ToolSpec, args: &Value) -> Result<(), ToolError> {
    let Some(schema) = TOOL_VALIDATORS.get(tool.name) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        return Err(ToolError::invalid_argument(format_schema_errors(
            tool, errors,
        )));
    }
    Ok(())
}

/// Fills in declared defaults for parameters the caller omitted.
pub fn apply_defaults(tool: &ToolSpec, args: &mut Map<String, Value>) {
    for param in &tool.params {
        if let Some(default) = &param.default {
            args.entry(param.name.to_string())
                .or_insert_with(|| default.clone());
        }
    }
}

fn format_schema_errors(tool: &ToolSpec, errors: jsonschema::ErrorIterator) -> String {
    let header = format!("Invalid arguments for {}", tool.name);
    let known_fields: Vec<String> = tool
        .params
        .iter()
        .map(|param| param.name.to_string())
        .collect();
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(10) {
        let instance_path = if err.instance_path.to_string().is_empty() {
            "(root)".to_string()
        } else {
            err.instance_path.to_string()
        };
        match &err.kind {
            jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", instance_path, unknown));
                    let suggestions = suggest(unknown, &known_fields, 3);
                    if !suggestions.is_empty() {
                        did_you_means
                            .push(format!("field '{}': {}", unknown, suggestions.join(", ")));
                    }
                }
            }
            jsonschema::error::ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!(
                    "{}: missing required field '{}'",
                    instance_path, prop
                ));
            }
            jsonschema::error::ValidationErrorKind::Type { kind } => {
                rendered.push(format!(
                    "{}: expected {}",
                    instance_path,
                    format_type_kind(kind)
                ));
            }
            _ => {
                rendered.push(format!("{}: {}", instance_path, err));
            }
        }
    }

    let mut lines = vec![header];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!(
            "Did you mean: {}",
            did_you_means
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &jsonschema::error::TypeKind) -> String {
    match kind {
        jsonschema::error::TypeKind::Single(primitive) => primitive.to_string(),
        jsonschema::error::TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_the_four_registry_tools() {
        let names: Vec<&str> = tool_catalog().iter().map(|tool| tool.name).collect();
        assert_eq!(
            names,
            vec![
                "search_contracts",
                "get_contract_details",
                "get_organizations",
                "get_statistics"
            ]
        );
    }

    #[test]
    fn schemas_mark_required_parameters() {
        let search = tool_by_name("search_contracts").unwrap();
        assert_eq!(search.input_schema["required"], json!(["query"]));
        let stats = tool_by_name("get_statistics").unwrap();
        assert_eq!(stats.input_schema["required"], json!([]));
    }

    #[test]
    fn schemas_carry_pagination_defaults() {
        let orgs = tool_by_name("get_organizations").unwrap();
        assert_eq!(orgs.input_schema["properties"]["limit"]["default"], json!(10));
        assert_eq!(orgs.input_schema["properties"]["offset"]["default"], json!(0));
    }

    #[test]
    fn missing_required_field_is_reported_by_name() {
        let search = tool_by_name("search_contracts").unwrap();
        let err = validate_tool_args(search, &json!({})).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid arguments for search_contracts"));
        assert!(message.contains("missing required field 'query'"));
    }

    #[test]
    fn wrong_type_is_reported_with_expected_type() {
        let search = tool_by_name("search_contracts").unwrap();
        let err = validate_tool_args(search, &json!({"query": "roads", "limit": "ten"}));
        let message = err.unwrap_err().to_string();
        assert!(message.contains("/limit"));
        assert!(message.contains("expected integer"));
    }

    #[test]
    fn unknown_field_gets_a_suggestion() {
        let search = tool_by_name("search_contracts").unwrap();
        let err = validate_tool_args(search, &json!({"query": "roads", "limt": 5}));
        let message = err.unwrap_err().to_string();
        assert!(message.contains("unknown field 'limt'"));
        assert!(message.contains("Did you mean"));
        assert!(message.contains("limit"));
    }

    #[test]
    fn explicit_null_is_a_type_error() {
        let orgs = tool_by_name("get_organizations").unwrap();
        assert!(validate_tool_args(orgs, &json!({"name": null})).is_err());
    }

    #[test]
    fn defaults_fill_only_missing_parameters() {
        let search = tool_by_name("search_contracts").unwrap();
        let mut args = json!({"query": "roads", "limit": 50})
            .as_object()
            .cloned()
            .unwrap();
        apply_defaults(search, &mut args);
        assert_eq!(args["limit"], json!(50));
        assert_eq!(args["offset"], json!(0));
    }

    #[test]
    fn statistics_accepts_an_empty_object() {
        let stats = tool_by_name("get_statistics").unwrap();
        assert!(validate_tool_args(stats, &json!({})).is_ok());
    }
}
