//! Response schema tree for structured (JSON) output.
//!
//! A `ResponseSchema` is rendered two ways:
//! - provider form (`type: "OBJECT"`, uppercase, OpenAPI subset) sent as
//!   `generationConfig.responseSchema`;
//! - JSON Schema form (`type: "object"`) used to validate what comes back.

use serde_json::{Map, Value, json};

use crate::error::LlmError;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<ResponseSchema>),
    Object {
        /// Insertion ordered properties.
        properties: Vec<(String, ResponseSchema)>,
        required: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub kind: SchemaKind,
    pub description: Option<String>,
    /// Allowed values (string schemas only).
    pub enum_values: Option<Vec<String>>,
}

impl ResponseSchema {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            enum_values: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    pub fn array(items: ResponseSchema) -> Self {
        Self::of(SchemaKind::Array(Box::new(items)))
    }

    /// Empty object; add fields with [`property`](Self::property) and
    /// [`required_property`](Self::required_property).
    pub fn object() -> Self {
        Self::of(SchemaKind::Object {
            properties: Vec::new(),
            required: Vec::new(),
        })
    }

    /// String restricted to a fixed set of values.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut s = Self::string();
        s.enum_values = Some(values.into_iter().map(Into::into).collect());
        s
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an optional property. No-op on non-object schemas.
    pub fn property(mut self, name: impl Into<String>, schema: ResponseSchema) -> Self {
        if let SchemaKind::Object { properties, .. } = &mut self.kind {
            let name = name.into();
            properties.retain(|(n, _)| *n != name);
            properties.push((name, schema));
        }
        self
    }

    /// Add a property and mark it required. No-op on non-object schemas.
    pub fn required_property(self, name: impl Into<String>, schema: ResponseSchema) -> Self {
        let name = name.into();
        let mut this = self.property(name.clone(), schema);
        if let SchemaKind::Object { required, .. } = &mut this.kind
            && !required.contains(&name)
        {
            required.push(name);
        }
        this
    }

    /// Names listed as required on the root object (empty for other kinds).
    pub fn required_fields(&self) -> &[String] {
        match &self.kind {
            SchemaKind::Object { required, .. } => required,
            _ => &[],
        }
    }

    /// Provider form: uppercase type names, sent as `responseSchema`.
    pub fn to_provider_value(&self) -> Value {
        self.render(|kind| match kind {
            SchemaKind::String => "STRING",
            SchemaKind::Number => "NUMBER",
            SchemaKind::Integer => "INTEGER",
            SchemaKind::Boolean => "BOOLEAN",
            SchemaKind::Array(_) => "ARRAY",
            SchemaKind::Object { .. } => "OBJECT",
        })
    }

    /// Standard JSON Schema form, used for local validation.
    pub fn to_json_schema(&self) -> Value {
        self.render(|kind| match kind {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array(_) => "array",
            SchemaKind::Object { .. } => "object",
        })
    }

    fn render(&self, type_name: fn(&SchemaKind) -> &'static str) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(type_name(&self.kind)));
        if let Some(desc) = &self.description {
            out.insert("description".into(), json!(desc));
        }
        if let Some(values) = &self.enum_values {
            out.insert("enum".into(), json!(values));
        }
        match &self.kind {
            SchemaKind::Array(items) => {
                out.insert("items".into(), items.render(type_name));
            }
            SchemaKind::Object {
                properties,
                required,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.render(type_name)))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                if !required.is_empty() {
                    out.insert("required".into(), json!(required));
                }
            }
            _ => {}
        }
        Value::Object(out)
    }

    /// Validate a parsed value against this schema.
    ///
    /// All violations are reported in one `SchemaViolation` message.
    pub fn validate(&self, instance: &Value) -> Result<(), LlmError> {
        let schema = self.to_json_schema();
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| LlmError::SchemaViolation(format!("unusable schema: {e}")))?;
        let problems: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(LlmError::SchemaViolation(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hospital_schema() -> ResponseSchema {
        ResponseSchema::object().required_property(
            "hospitals",
            ResponseSchema::array(
                ResponseSchema::object()
                    .required_property("name", ResponseSchema::string())
                    .required_property("address", ResponseSchema::string())
                    .property("emergencyRoom", ResponseSchema::boolean())
                    .property("rating", ResponseSchema::number()),
            ),
        )
    }

    #[test]
    fn provider_form_uses_uppercase_types() {
        let v = hospital_schema().to_provider_value();
        assert_eq!(v["type"], "OBJECT");
        assert_eq!(v["properties"]["hospitals"]["type"], "ARRAY");
        assert_eq!(v["properties"]["hospitals"]["items"]["type"], "OBJECT");
        assert_eq!(
            v["properties"]["hospitals"]["items"]["properties"]["rating"]["type"],
            "NUMBER"
        );
        assert_eq!(v["required"], json!(["hospitals"]));
    }

    #[test]
    fn json_schema_form_uses_lowercase_types() {
        let v = hospital_schema().to_json_schema();
        assert_eq!(v["type"], "object");
        assert_eq!(
            v["properties"]["hospitals"]["items"]["required"],
            json!(["name", "address"])
        );
    }

    #[test]
    fn validate_accepts_matching_value() {
        let value = json!({
            "hospitals": [
                { "name": "City General", "address": "1 Main St", "emergencyRoom": true, "rating": 4.5 }
            ]
        });
        assert!(hospital_schema().validate(&value).is_ok());
    }

    #[test]
    fn validate_rejects_missing_required_field() {
        let value = json!({ "hospitals": [ { "name": "City General" } ] });
        let err = hospital_schema().validate(&value).unwrap_err();
        assert!(matches!(err, LlmError::SchemaViolation(msg) if msg.contains("address")));
    }

    #[test]
    fn required_property_is_not_duplicated() {
        let s = ResponseSchema::object()
            .required_property("a", ResponseSchema::string())
            .required_property("a", ResponseSchema::integer());
        assert_eq!(s.required_fields(), &["a".to_string()]);
        assert_eq!(s.to_json_schema()["properties"]["a"]["type"], "integer");
    }

    #[test]
    fn enumeration_renders_enum() {
        let s = ResponseSchema::enumeration(["low", "medium", "high"]);
        assert_eq!(s.to_provider_value()["enum"], json!(["low", "medium", "high"]));
        assert!(s.validate(&json!("urgent")).is_err());
    }
}
