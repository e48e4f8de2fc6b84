use crate::{
    docstring::{extract_descriptions, DocComment},
    error::{Mismatch, SchemaError},
};
use std::{collections::BTreeMap, fmt};

/// Closed set of supported field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Str,
    /// List of strings, bound from a multi-value flag.
    List,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Str => "str",
            FieldKind::List => "list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete value of one of the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Str(_) => FieldKind::Str,
            FieldValue::List(_) => FieldKind::List,
        }
    }

    /// Reads raw command-line text as `kind`. `List` values are assembled from
    /// multiple raw occurrences by the parser, never from a single text.
    pub(crate) fn from_raw(kind: FieldKind, raw: &str) -> Option<Self> {
        match kind {
            FieldKind::Bool => match raw {
                "true" => Some(FieldValue::Bool(true)),
                "false" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            FieldKind::Int => raw.parse().ok().map(FieldValue::Int),
            FieldKind::Float => raw.parse().ok().map(FieldValue::Float),
            FieldKind::Str => Some(FieldValue::Str(raw.to_string())),
            FieldKind::List => Some(FieldValue::List(vec![raw.to_string()])),
        }
    }
}

impl From<&FieldValue> for serde_json::Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Bool(b) => (*b).into(),
            FieldValue::Int(i) => (*i).into(),
            FieldValue::Float(f) => (*f).into(),
            FieldValue::Str(s) => s.clone().into(),
            FieldValue::List(items) => items.clone().into(),
        }
    }
}

/// A declared field: the "type annotation plus optional initializer" that one
/// command-line argument is derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub kind: FieldKind,
    pub default: Option<FieldValue>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Gives the field an initial value, making its flag optional.
    pub fn default(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }
}

/// A partially specified custom argument. Unset pieces are completed from the
/// matching declaration and the doc text when the schema is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSpec {
    pub name: String,
    pub kind: Option<FieldKind>,
    pub help: Option<String>,
    pub default: Option<FieldValue>,
    pub required: Option<bool>,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn default(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// A fully completed argument, ready to be registered with the underlying
/// parser.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Argument {
    pub name: String,
    pub kind: FieldKind,
    pub help: String,
    pub default: Option<FieldValue>,
    pub required: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    doc: String,
    decls: Vec<FieldDecl>,
    custom: Vec<ArgSpec>,
    constants: BTreeMap<String, FieldValue>,
}

impl SchemaBuilder {
    /// Doc text: an optional summary paragraph followed by
    /// `:field_name: description` lines.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = text.into();
        self
    }

    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.decls.push(decl);
        self
    }

    /// Registers a custom argument ahead of the auto-generated ones.
    pub fn argument(mut self, spec: ArgSpec) -> Self {
        self.custom.push(spec);
        self
    }

    /// A named concrete value that is part of the serialized output but never
    /// parsed from the command line.
    pub fn constant(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    /// Completes custom specs from the declarations and auto-registers every
    /// remaining declared field: required when it has no default, optional
    /// otherwise, help text `(<kind>) <description>`.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let doc = extract_descriptions(&self.doc);

        for (index, decl) in self.decls.iter().enumerate() {
            if self.decls[..index].iter().any(|d| d.name == decl.name) {
                return Err(SchemaError::DuplicateField(decl.name.clone()));
            }
            if let Some(default) = &decl.default {
                if default.kind() != decl.kind {
                    return Err(SchemaError::DefaultKindMismatch {
                        field: decl.name.clone(),
                        mismatch: Mismatch::new(decl.kind, default.kind()),
                    });
                }
            }
        }

        let mut arguments = Vec::with_capacity(self.decls.len().max(self.custom.len()));
        for (index, spec) in self.custom.iter().enumerate() {
            if self.custom[..index].iter().any(|s| s.name == spec.name) {
                return Err(SchemaError::DuplicateArgument(spec.name.clone()));
            }
            arguments.push(complete_spec(spec, &self.decls, &doc)?);
        }
        for decl in &self.decls {
            if self.custom.iter().any(|s| s.name == decl.name) {
                continue;
            }
            arguments.push(Argument {
                name: decl.name.clone(),
                kind: decl.kind,
                help: format_help(decl.kind, doc.description(&decl.name)),
                default: decl.default.clone(),
                required: decl.default.is_none(),
            });
        }

        tracing::debug!(
            fields = self.decls.len(),
            arguments = arguments.len(),
            "built argument schema"
        );

        Ok(Schema {
            summary: doc.summary,
            decls: self.decls,
            arguments,
            constants: self.constants,
        })
    }
}

fn complete_spec(
    spec: &ArgSpec,
    decls: &[FieldDecl],
    doc: &DocComment,
) -> Result<Argument, SchemaError> {
    let decl = decls.iter().find(|d| d.name == spec.name);
    let kind = spec
        .kind
        .or(decl.map(|d| d.kind))
        .ok_or_else(|| SchemaError::UnknownKind(spec.name.clone()))?;
    let default = spec
        .default
        .clone()
        .or_else(|| decl.and_then(|d| d.default.clone()));
    if let Some(default) = &default {
        if default.kind() != kind {
            return Err(SchemaError::DefaultKindMismatch {
                field: spec.name.clone(),
                mismatch: Mismatch::new(kind, default.kind()),
            });
        }
    }
    Ok(Argument {
        name: spec.name.clone(),
        kind,
        help: spec
            .help
            .clone()
            .unwrap_or_else(|| format_help(kind, doc.description(&spec.name))),
        required: spec.required.unwrap_or(default.is_none()),
        default,
    })
}

fn format_help(kind: FieldKind, description: &str) -> String {
    format!("({kind}) {description}").trim_end().to_string()
}

/// Ordered argument specifications plus everything the parser needs around
/// them: the doc summary, the declarations the exact-type check runs against,
/// and the constants carried into the serialized output.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) summary: Option<String>,
    pub(crate) decls: Vec<FieldDecl>,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) constants: BTreeMap<String, FieldValue>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub(crate) fn decl(&self, name: &str) -> Option<&FieldDecl> {
        self.decls.iter().find(|d| d.name == name)
    }
}
