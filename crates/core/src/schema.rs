//! Tool input contracts.
//!
//! Each tool's arguments are a typed struct deriving [`JsonSchema`]. The
//! derived schema is what `tools/list` advertises, and the same schema,
//! compiled with `jsonschema`, checks incoming arguments before a vendor
//! client is ever touched. Defaults come from `#[serde(default)]` when the
//! arguments are deserialized.

use chrono::NaiveDate;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use schemars::gen::{SchemaGenerator, SchemaSettings};
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::{Error, Result};
use crate::tools::ToolDefinition;

/// Argument type for tools that take none.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoArguments {}

/// `#[schemars(schema_with = "bridge_core::schema::date")]` for
/// `YYYY-MM-DD` string fields.
pub fn date(_: &mut SchemaGenerator) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        format: Some("date".to_string()),
        ..Default::default()
    }
    .into()
}

/// The inlined draft-07 schema for `A`, without the `$schema` and `title`
/// keys.
pub fn input_schema<A: JsonSchema>() -> Value {
    let generator: SchemaGenerator = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    let root = generator.into_root_schema_for::<A>();

    let mut schema = serde_json::to_value(root).unwrap_or_else(|_| json!({ "type": "object" }));
    if let Some(map) = schema.as_object_mut() {
        map.remove("$schema");
        map.remove("title");
    }
    schema
}

fn is_http_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn is_calendar_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn compile(schema: &Value) -> std::result::Result<JSONSchema, String> {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .should_validate_formats(true)
        .with_format("uri", is_http_url)
        .with_format("date", is_calendar_date)
        .compile(schema)
        .map_err(|e| e.to_string())
}

/// `/items/1/quantity` becomes `items[1].quantity`.
fn field_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push_str(&format!("[{}]", segment));
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);
        }
    }
    path
}

fn join_path(parent: String, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

fn validation_error(error: ValidationError<'_>) -> Error {
    let path = field_path(&error.instance_path.to_string());

    let (field, reason) = match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            (join_path(path, &name), "missing required field".to_string())
        }
        ValidationErrorKind::MinLength { limit } => {
            (path, format!("must be at least {} characters", limit))
        }
        ValidationErrorKind::MaxLength { limit } => {
            let got = error.instance.as_str().map_or(0, |s| s.chars().count());
            (path, format!("must be at most {} characters (got {})", limit, got))
        }
        ValidationErrorKind::Minimum { limit } => (path, format!("must be >= {}", limit)),
        ValidationErrorKind::Maximum { limit } => (path, format!("must be <= {}", limit)),
        ValidationErrorKind::Enum { options } => {
            let allowed = options
                .as_array()
                .map(|values| {
                    values
                        .iter()
                        .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_else(|| options.to_string());
            (path, format!("must be one of: {}", allowed))
        }
        ValidationErrorKind::Format { format } => {
            let reason = match format.to_string().as_str() {
                "uri" => "must be an http(s) URL".to_string(),
                "date" => "must be a date in YYYY-MM-DD format".to_string(),
                other => format!("must be a valid {}", other),
            };
            (path, reason)
        }
        ValidationErrorKind::Type { .. } => (path, "has the wrong type".to_string()),
        _ => (path, error.to_string()),
    };

    let field = if field.is_empty() {
        "arguments".to_string()
    } else {
        field
    };
    Error::Validation { field, reason }
}

pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    validator: std::result::Result<JSONSchema, String>,
}

impl ToolSpec {
    /// A tool whose arguments deserialize into `A`.
    pub fn new<A: JsonSchema>(name: &'static str, description: &'static str) -> Self {
        let input_schema = input_schema::<A>();
        let validator = compile(&input_schema);
        Self {
            name,
            description,
            input_schema,
            validator,
        }
    }

    pub fn without_arguments(name: &'static str, description: &'static str) -> Self {
        Self::new::<NoArguments>(name, description)
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema.clone(),
        }
    }

    /// Checks `arguments` against the schema. Absent arguments are treated
    /// as an empty object.
    pub fn validate(&self, arguments: Value) -> Result<Value> {
        let validator = self
            .validator
            .as_ref()
            .map_err(|e| Error::Config(format!("schema for `{}` does not compile: {}", self.name, e)))?;

        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        if let Err(mut errors) = validator.validate(&arguments) {
            if let Some(first) = errors.next() {
                return Err(validation_error(first));
            }
        }
        Ok(arguments)
    }
}

/// Deserialize validated arguments into a typed request, filling serde
/// defaults.
pub fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::validation("arguments", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct PostArgs {
        #[schemars(description = "Body", length(min = 1, max = 10))]
        text: String,
        #[schemars(description = "Link", url)]
        link: Option<String>,
        #[serde(default = "default_limit")]
        #[schemars(description = "Limit", range(min = 1, max = 100))]
        limit: u32,
        #[serde(default)]
        visibility: Audience,
    }

    #[derive(Debug, Default, PartialEq, Deserialize, serde::Serialize, JsonSchema)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    enum Audience {
        #[default]
        Public,
        Connections,
    }

    fn default_limit() -> u32 {
        10
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Line {
        name: String,
        quantity: f64,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    struct InvoiceArgs {
        items: Vec<Line>,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    struct DateArgs {
        #[serde(default)]
        #[schemars(schema_with = "date")]
        date: Option<String>,
    }

    fn post_spec() -> ToolSpec {
        ToolSpec::new::<PostArgs>("post", "Publish a post")
    }

    fn reason(err: Error) -> (String, String) {
        match err {
            Error::Validation { field, reason } => (field, reason),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn schema_lists_required_and_bounds() {
        let def = post_spec().definition();
        let schema = &def.input_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["text"]));
        assert_eq!(schema["properties"]["text"]["maxLength"], 10);
        assert_eq!(schema["properties"]["text"]["description"], "Body");
        assert_eq!(schema["properties"]["link"]["format"], "uri");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["properties"]["limit"]["default"], 10);
        assert_eq!(schema["properties"]["visibility"]["enum"], json!(["PUBLIC", "CONNECTIONS"]));
        assert_eq!(schema["properties"]["visibility"]["default"], "PUBLIC");
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("definitions").is_none());
    }

    #[test]
    fn no_argument_tools_accept_empty_input() {
        let spec = ToolSpec::without_arguments("ping", "Ping");
        assert_eq!(spec.definition().input_schema["type"], "object");
        assert!(spec.definition().input_schema.get("required").is_none());
        assert_eq!(spec.validate(Value::Null).unwrap(), json!({}));
    }

    #[test]
    fn defaults_filled_on_parse() {
        let args = post_spec().validate(json!({ "text": "hi" })).unwrap();
        let parsed: PostArgs = parse_args(args).unwrap();
        assert_eq!(parsed.limit, 10);
        assert!(parsed.link.is_none());
        assert_eq!(parsed.visibility, Audience::Public);
    }

    #[test]
    fn rejects_missing_required() {
        let (field, why) = reason(post_spec().validate(json!({})).unwrap_err());
        assert_eq!(field, "text");
        assert_eq!(why, "missing required field");
    }

    #[test]
    fn rejects_too_long_counting_chars() {
        assert!(post_spec().validate(json!({ "text": "ééééééééé" })).is_ok());
        let (field, why) = reason(post_spec().validate(json!({ "text": "x".repeat(11) })).unwrap_err());
        assert_eq!(field, "text");
        assert_eq!(why, "must be at most 10 characters (got 11)");
    }

    #[test]
    fn rejects_wrong_types_and_ranges() {
        let spec = post_spec();
        assert!(spec.validate(json!({ "text": 5 })).is_err());
        assert!(spec.validate(json!({ "text": "" })).is_err());
        assert!(spec.validate(json!({ "text": "a", "limit": 0 })).is_err());
        assert!(spec.validate(json!({ "text": "a", "limit": 101 })).is_err());
        assert!(spec.validate(json!({ "text": "a", "limit": 2.5 })).is_err());
        assert!(spec.validate(json!({ "text": "a", "link": "not a url" })).is_err());
        assert!(spec.validate(json!("text")).is_err());
    }

    #[test]
    fn enum_values_are_listed() {
        let (field, why) =
            reason(post_spec().validate(json!({ "text": "a", "visibility": "SECRET" })).unwrap_err());
        assert_eq!(field, "visibility");
        assert!(why.contains("PUBLIC"));
        assert!(post_spec()
            .validate(json!({ "text": "a", "visibility": "CONNECTIONS" }))
            .is_ok());
    }

    #[test]
    fn validates_array_items_with_paths() {
        let spec = ToolSpec::new::<InvoiceArgs>("invoice", "Invoice");
        assert_eq!(
            spec.definition().input_schema["properties"]["items"]["items"]["type"],
            "object"
        );

        assert!(spec
            .validate(json!({ "items": [{ "name": "a", "quantity": 1 }] }))
            .is_ok());

        let (field, why) = reason(
            spec.validate(json!({ "items": [{ "name": "a", "quantity": 1 }, { "name": "b" }] }))
                .unwrap_err(),
        );
        assert_eq!(field, "items[1].quantity");
        assert_eq!(why, "missing required field");
    }

    #[test]
    fn validates_dates() {
        let spec = ToolSpec::new::<DateArgs>("d", "d");
        assert_eq!(spec.definition().input_schema["properties"]["date"]["format"], "date");
        assert!(spec.validate(json!({ "date": "2026-01-31" })).is_ok());
        assert!(spec.validate(json!({})).is_ok());
        assert!(spec.validate(json!({ "date": "2026-02-31" })).is_err());
        let (field, why) = reason(spec.validate(json!({ "date": "31/01/2026" })).unwrap_err());
        assert_eq!(field, "date");
        assert_eq!(why, "must be a date in YYYY-MM-DD format");
    }

    #[test]
    fn pointer_to_field_path() {
        assert_eq!(field_path(""), "");
        assert_eq!(field_path("/text"), "text");
        assert_eq!(field_path("/items/0/price"), "items[0].price");
    }

    #[test]
    fn parse_args_maps_serde_errors() {
        #[derive(Debug, Deserialize)]
        struct Args {
            #[allow(dead_code)]
            n: u32,
        }
        let (field, _) = reason(parse_args::<Args>(json!({ "n": "x" })).unwrap_err());
        assert_eq!(field, "arguments");
    }
}
