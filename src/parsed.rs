use crate::{
    error::Error,
    reproducibility::RunContext,
    schema::FieldValue,
};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::{collections::BTreeMap, fmt, fs, path::Path};

/// The populated record produced by a successful parse: one owned value per
/// declared field, plus the schema's constants. Values are never shared
/// between records, so mutating one parse result cannot leak into another.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    values: BTreeMap<String, FieldValue>,
    constants: BTreeMap<String, FieldValue>,
}

impl ParsedArgs {
    pub(crate) fn new(constants: BTreeMap<String, FieldValue>) -> Self {
        Self {
            values: BTreeMap::new(),
            constants,
        }
    }

    pub(crate) fn assign(&mut self, name: String, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(FieldValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(FieldValue::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Writes a derived value. Meant for the post-processing hook; no type
    /// check is applied.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Merge of the constants and every field's current value. Field values
    /// win on name collision.
    pub fn as_dict(&self) -> BTreeMap<String, serde_json::Value> {
        let mut dict: BTreeMap<String, serde_json::Value> = self
            .constants
            .iter()
            .map(|(name, value)| (name.clone(), value.into()))
            .collect();
        for (name, value) in &self.values {
            dict.insert(name.clone(), value.into());
        }
        dict
    }

    /// Writes `as_dict()` plus a `"reproducibility"` block to `path` as UTF-8
    /// JSON with 4-space indentation and lexicographically sorted keys.
    pub fn save(&self, path: impl AsRef<Path>, ctx: &RunContext) -> Result<(), Error> {
        let path = path.as_ref();
        let mut log = self.as_dict();
        log.insert("reproducibility".to_string(), serde_json::to_value(ctx)?);

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        log.serialize(&mut serializer)?;

        fs::write(path, buf).map_err(|source| Error::Save {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "saved argument log");
        Ok(())
    }
}

impl fmt::Display for ParsedArgs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = serde_json::to_string_pretty(&self.as_dict()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
