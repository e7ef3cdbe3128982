//! Declared resource fields
//!
//! A [`Schema`] maps each local field name onto a path inside the remote
//! object, together with the coercion to apply and how the field takes
//! part in create/update requests.

use crate::record::FlatValue;

/// Dotted path into a nested JSON object (`request.hostname`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Bool,
    StringList,
    StringMap,
    /// Single nested object
    Object(Schema),
    /// Ordered list of nested objects
    List(Schema),
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
            FieldKind::StringList => "list of strings",
            FieldKind::StringMap => "map of strings",
            FieldKind::Object(_) => "object",
            FieldKind::List(_) => "list of objects",
        }
    }

    /// Value used when the remote object omits the field
    pub fn zero(&self) -> FlatValue {
        match self {
            FieldKind::String => FlatValue::String(String::new()),
            FieldKind::Int => FlatValue::Int(0),
            FieldKind::Bool => FlatValue::Bool(false),
            FieldKind::StringList => FlatValue::StringList(Vec::new()),
            FieldKind::StringMap => FlatValue::StringMap(Default::default()),
            FieldKind::Object(_) => FlatValue::Null,
            FieldKind::List(_) => FlatValue::List(Vec::new()),
        }
    }
}

/// How a field participates in requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Server-managed, never sent
    Computed,
    /// Sent on create and on update when changed
    Input,
    /// Sent on create only; changing it requires replacement
    Immutable,
    /// Sent on create/update but never returned by the API
    WriteOnly,
    /// Path parameter taken from the state id. Only appears in request
    /// bodies when it has an explicit request path.
    Address,
}

impl FieldMode {
    pub fn is_input(&self) -> bool {
        !matches!(self, FieldMode::Computed)
    }

    pub fn is_updatable(&self) -> bool {
        matches!(self, FieldMode::Input | FieldMode::WriteOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub path: FieldPath,
    /// Path in request bodies when it differs from the response path
    pub request_path: Option<FieldPath>,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FlatValue>,
    pub mode: FieldMode,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, path: &str, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            path: FieldPath::parse(path),
            request_path: None,
            kind,
            required: false,
            default: None,
            mode: FieldMode::Computed,
        }
    }

    pub fn string(name: impl Into<String>, path: &str) -> Self {
        Self::new(name, path, FieldKind::String)
    }

    pub fn int(name: impl Into<String>, path: &str) -> Self {
        Self::new(name, path, FieldKind::Int)
    }

    pub fn bool(name: impl Into<String>, path: &str) -> Self {
        Self::new(name, path, FieldKind::Bool)
    }

    pub fn string_list(name: impl Into<String>, path: &str) -> Self {
        Self::new(name, path, FieldKind::StringList)
    }

    pub fn string_map(name: impl Into<String>, path: &str) -> Self {
        Self::new(name, path, FieldKind::StringMap)
    }

    pub fn object(name: impl Into<String>, path: &str, schema: Schema) -> Self {
        Self::new(name, path, FieldKind::Object(schema))
    }

    pub fn list(name: impl Into<String>, path: &str, schema: Schema) -> Self {
        Self::new(name, path, FieldKind::List(schema))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<FlatValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn input(mut self) -> Self {
        self.mode = FieldMode::Input;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.mode = FieldMode::Immutable;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.mode = FieldMode::WriteOnly;
        self
    }

    pub fn address(mut self) -> Self {
        self.mode = FieldMode::Address;
        self
    }

    pub fn sent_as(mut self, path: &str) -> Self {
        self.request_path = Some(FieldPath::parse(path));
        self
    }

    pub fn request_path(&self) -> &FieldPath {
        self.request_path.as_ref().unwrap_or(&self.path)
    }

    /// Whether the field goes into a create request body
    pub fn in_create_body(&self) -> bool {
        match self.mode {
            FieldMode::Computed => false,
            FieldMode::Address => self.request_path.is_some(),
            _ => true,
        }
    }

    /// Value for an absent remote field
    pub fn absent_value(&self) -> FlatValue {
        self.default.clone().unwrap_or_else(|| self.kind.zero())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.mode.is_input())
    }
}
