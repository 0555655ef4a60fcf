//! Declared schemas: which fields each kind accepts, which are required,
//! which enum values are allowed, and which changes force replacement.
//!
//! Validation runs against the serialized declared model (a JSON object keyed
//! by field name), so one routine serves every kind.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ProviderError;
use crate::json;

/// Who supplies a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be declared.
    Required,
    /// May be declared; when absent it is simply not sent.
    Optional,
    /// May be declared; when absent the service fills it in.
    OptionalComputed,
    /// Always filled in by the service.
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Bool,
    StringList,
    /// Opaque structured value declared as JSON text.
    Json,
}

/// One declared field.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub presence: Presence,
    pub ty: FieldType,
    /// Allowed values; empty means unrestricted.
    pub allowed: &'static [&'static str],
    /// Never logged, never returned by the service.
    pub sensitive: bool,
    /// A change to this field destroys and recreates the entity.
    pub replace_on_change: bool,
    /// Value a boolean field takes on create when left unset.
    pub default: Option<bool>,
}

impl Field {
    const fn new(name: &'static str, presence: Presence, ty: FieldType) -> Self {
        Self {
            name,
            presence,
            ty,
            allowed: &[],
            sensitive: false,
            replace_on_change: false,
            default: None,
        }
    }

    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self::new(name, Presence::Required, ty)
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self::new(name, Presence::Optional, ty)
    }

    pub const fn optional_computed(name: &'static str, ty: FieldType) -> Self {
        Self::new(name, Presence::OptionalComputed, ty)
    }

    pub const fn computed(name: &'static str, ty: FieldType) -> Self {
        Self::new(name, Presence::Computed, ty)
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub const fn replace_on_change(mut self) -> Self {
        self.replace_on_change = true;
        self
    }

    pub const fn with_default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether the operator may set this field at all.
    pub fn is_configurable(&self) -> bool {
        self.presence != Presence::Computed
    }
}

/// The declared shape of one managed kind.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub kind: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Create-time default of a boolean field, if it declares one.
    pub fn default_bool(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(|f| f.default)
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "must be one of {}; got '{}'",
                        Self::NAMES.join(", "),
                        other
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Who can see a server, tool, resource or prompt.
    Visibility {
        Public => "public",
        Private => "private",
        Team => "team",
    }
}

string_enum! {
    /// How the gateway talks to its upstream.
    GatewayTransport {
        StreamableHttp => "STREAMABLEHTTP",
        Sse => "SSE",
        Stdio => "STDIO",
    }
}

use FieldType::{Bool, Int, Json, StringList};

const ID: Field = Field::computed("id", FieldType::String);
const CREATED_AT: Field = Field::computed("created_at", FieldType::String);
const UPDATED_AT: Field = Field::computed("updated_at", FieldType::String);
const VISIBILITY: Field =
    Field::optional_computed("visibility", FieldType::String).one_of(Visibility::NAMES);
/// The update bodies cannot move an entity between teams.
const TEAM_ID: Field = Field::optional("team_id", FieldType::String).replace_on_change();
const TAGS: Field = Field::optional("tags", StringList);
const NAME: Field = Field::required("name", FieldType::String);
const DESCRIPTION: Field = Field::optional("description", FieldType::String);

pub const GATEWAY: Schema = Schema {
    kind: "gateway",
    fields: &[
        ID,
        NAME,
        Field::required("url", FieldType::String),
        DESCRIPTION,
        Field::optional_computed("transport", FieldType::String).one_of(GatewayTransport::NAMES),
        Field::optional_computed("capabilities", Json),
        Field::optional_computed("health_check_url", FieldType::String),
        Field::optional_computed("health_check_interval", Int),
        Field::optional_computed("health_check_timeout", Int),
        Field::optional_computed("health_check_retries", Int),
        Field::optional_computed("is_active", Bool).with_default(true),
        TAGS,
        Field::optional("passthrough_headers", StringList),
        Field::optional("auth_type", FieldType::String),
        Field::optional("auth_value", FieldType::String).sensitive(),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const SERVER: Schema = Schema {
    kind: "server",
    fields: &[
        ID,
        NAME,
        DESCRIPTION,
        TAGS,
        Field::optional("tool_ids", StringList),
        VISIBILITY,
        TEAM_ID,
        Field::computed("is_active", Bool),
        Field::computed("status", FieldType::String),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const TOOL: Schema = Schema {
    kind: "tool",
    fields: &[
        ID,
        NAME,
        DESCRIPTION,
        Field::optional_computed("input_schema", Json),
        TAGS,
        VISIBILITY,
        TEAM_ID,
        Field::computed("is_active", Bool),
        Field::computed("gateway_id", FieldType::String),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const RESOURCE: Schema = Schema {
    kind: "resource",
    fields: &[
        ID,
        Field::required("uri", FieldType::String),
        NAME,
        DESCRIPTION,
        Field::optional_computed("mime_type", FieldType::String),
        TAGS,
        VISIBILITY,
        TEAM_ID,
        Field::computed("is_active", Bool),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const PROMPT: Schema = Schema {
    kind: "prompt",
    fields: &[
        ID,
        NAME,
        DESCRIPTION,
        Field::optional_computed("arguments", Json),
        TAGS,
        VISIBILITY,
        TEAM_ID,
        Field::computed("is_active", Bool),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const ROOT: Schema = Schema {
    kind: "root",
    fields: &[
        Field::required("uri", FieldType::String).replace_on_change(),
        Field::optional_computed("name", FieldType::String).replace_on_change(),
    ],
};

/// A value counts as declared when it is present and not an empty string.
fn declared(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    }
}

/// Check a declared model against its schema.
///
/// Required fields must be present and non-empty, and enum-restricted
/// fields must hold an allowed value. Runs before any request is sent.
pub fn validate(schema: &Schema, declared_model: &Value) -> crate::Result<()> {
    for field in schema.fields {
        if !field.is_configurable() {
            continue;
        }
        let value = declared(declared_model.get(field.name));
        match (value, field.presence) {
            (None, Presence::Required) => {
                return Err(ProviderError::InvalidField(
                    field.name.to_string(),
                    format!("{} requires this field", schema.kind),
                ));
            }
            (None, _) => {}
            (Some(value), _) => {
                if field.allowed.is_empty() {
                    continue;
                }
                let text = value.as_str().unwrap_or_default();
                if !field.allowed.contains(&text) {
                    return Err(ProviderError::InvalidField(
                        field.name.to_string(),
                        format!("must be one of {}; got '{}'", field.allowed.join(", "), text),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Configurable fields whose declared value differs between two models.
///
/// Computed fields never count. An optional-computed field left undeclared
/// in `planned` adopts whatever the service chose, and an undeclared
/// sensitive field keeps its last-known value, so neither is a change.
/// JSON blobs compare structurally.
pub fn changed_fields(schema: &Schema, prior: &Value, planned: &Value) -> Vec<&'static str> {
    schema
        .fields
        .iter()
        .filter(|field| field.is_configurable())
        .filter(|field| {
            let old = declared(prior.get(field.name));
            let new = declared(planned.get(field.name));
            if new.is_none() && (field.presence == Presence::OptionalComputed || field.sensitive) {
                return false;
            }
            match field.ty {
                FieldType::Json => {
                    !json::blobs_equivalent(old.and_then(Value::as_str), new.and_then(Value::as_str))
                }
                FieldType::StringList => {
                    let empty = |v: Option<&Value>| {
                        v.and_then(Value::as_array).is_none_or(|items| items.is_empty())
                    };
                    if empty(old) && empty(new) {
                        false
                    } else {
                        old != new
                    }
                }
                _ => old != new,
            }
        })
        .map(|field| field.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visibility_parse() {
        assert_eq!("team".parse::<Visibility>().unwrap(), Visibility::Team);
        assert_eq!(Visibility::Private.to_string(), "private");
        let err = "secret".parse::<Visibility>().unwrap_err();
        assert_eq!(err, "must be one of public, private, team; got 'secret'");
    }

    #[test]
    fn test_transport_names() {
        assert_eq!(GatewayTransport::NAMES, &["STREAMABLEHTTP", "SSE", "STDIO"]);
        assert!("sse".parse::<GatewayTransport>().is_err());
    }

    #[test]
    fn test_required_field_missing() {
        let err = validate(&TOOL, &json!({"description": "x"})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidField(ref f, _) if f == "name"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_required_field_empty_string() {
        let err = validate(&ROOT, &json!({"uri": ""})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidField(ref f, _) if f == "uri"));
    }

    #[test]
    fn test_disallowed_enum_value() {
        let err = validate(&SERVER, &json!({"name": "s", "visibility": "secret"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for 'visibility': must be one of public, private, team; got 'secret'"
        );
    }

    #[test]
    fn test_gateway_transport_validated() {
        let model = json!({"name": "g", "url": "http://u", "transport": "WEBSOCKET"});
        let err = validate(&GATEWAY, &model).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidField(ref f, _) if f == "transport"));
        let model = json!({"name": "g", "url": "http://u", "transport": "SSE"});
        validate(&GATEWAY, &model).unwrap();
    }

    #[test]
    fn test_computed_fields_not_validated() {
        validate(&SERVER, &json!({"name": "s", "status": "anything", "id": ""})).unwrap();
    }

    #[test]
    fn test_changed_fields_ignores_computed() {
        let prior = json!({"id": "t-1", "name": "a", "updated_at": "2024-01-01"});
        let planned = json!({"id": "t-1", "name": "a", "updated_at": "2025-01-01"});
        assert!(changed_fields(&TOOL, &prior, &planned).is_empty());
    }

    #[test]
    fn test_changed_fields_undeclared_computed_is_not_change() {
        let prior = json!({"name": "a", "visibility": "public"});
        let planned = json!({"name": "a", "visibility": null});
        assert!(changed_fields(&TOOL, &prior, &planned).is_empty());

        let planned = json!({"name": "a", "visibility": "private"});
        assert_eq!(changed_fields(&TOOL, &prior, &planned), vec!["visibility"]);
    }

    #[test]
    fn test_changed_fields_json_structural() {
        let prior = json!({"name": "a", "input_schema": "{\"type\":\"object\"}"});
        let planned = json!({"name": "a", "input_schema": "{ \"type\" : \"object\" }"});
        assert!(changed_fields(&TOOL, &prior, &planned).is_empty());
    }

    #[test]
    fn test_changed_fields_empty_lists_equal() {
        let prior = json!({"name": "a", "tags": []});
        let planned = json!({"name": "a"});
        assert!(changed_fields(&SERVER, &prior, &planned).is_empty());

        let planned = json!({"name": "a", "tags": ["x"]});
        assert_eq!(changed_fields(&SERVER, &prior, &planned), vec!["tags"]);
    }

    #[test]
    fn test_changed_fields_undeclared_secret_is_not_change() {
        let prior = json!({"name": "g", "url": "http://u", "auth_value": "s3cr3t"});
        let planned = json!({"name": "g", "url": "http://u", "auth_value": null});
        assert!(changed_fields(&GATEWAY, &prior, &planned).is_empty());

        let planned = json!({"name": "g", "url": "http://u", "auth_value": "rotated"});
        assert_eq!(changed_fields(&GATEWAY, &prior, &planned), vec!["auth_value"]);
    }

    #[test]
    fn test_gateway_active_default() {
        assert_eq!(GATEWAY.default_bool("is_active"), Some(true));
        assert_eq!(SERVER.default_bool("is_active"), None);
        assert_eq!(GATEWAY.default_bool("no_such_field"), None);
    }

    #[test]
    fn test_root_fields_replace_on_change() {
        assert!(ROOT.fields.iter().all(|f| f.replace_on_change));
        assert!(GATEWAY.field("auth_value").unwrap().sensitive);
        assert!(!TOOL.field("name").unwrap().replace_on_change);
    }

    #[test]
    fn test_team_change_forces_replacement() {
        for schema in [&SERVER, &TOOL, &RESOURCE, &PROMPT] {
            assert!(schema.field("team_id").unwrap().replace_on_change);
        }
        let prior = json!({"name": "s", "team_id": "team-a"});
        let planned = json!({"name": "s", "team_id": "team-b"});
        assert_eq!(changed_fields(&SERVER, &prior, &planned), vec!["team_id"]);
    }
}
