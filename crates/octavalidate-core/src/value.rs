//! Views over payload values
//!
//! Payloads are plain `serde_json` objects. [`FieldValue`] wraps the value
//! found for a non-file field (or its absence); [`FileSet`] normalizes what
//! was supplied for a file field into a list of [`FileDescriptor`]s.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// The value of one non-file field in a payload
#[derive(Debug, Clone, Copy)]
pub struct FieldValue<'a> {
    raw: Option<&'a Value>,
}

impl<'a> FieldValue<'a> {
    pub fn new(raw: Option<&'a Value>) -> Self {
        Self { raw }
    }

    /// The underlying JSON value, `None` when the field is absent
    pub fn raw(&self) -> Option<&'a Value> {
        self.raw
    }

    /// Whether the field was present and not `null`
    pub fn is_present(&self) -> bool {
        !matches!(self.raw, None | Some(Value::Null))
    }

    /// Emptiness as used by `required`
    ///
    /// Absent, `null`, all-whitespace strings, empty arrays and empty objects
    /// are empty. Booleans and numbers never are.
    pub fn is_empty(&self) -> bool {
        match self.raw {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Bool(_)) | Some(Value::Number(_)) => false,
        }
    }

    /// Text form of a scalar value
    ///
    /// Strings are borrowed, numbers and booleans are rendered. Arrays,
    /// objects and absent values have no text form.
    pub fn as_text(&self) -> Option<Cow<'a, str>> {
        match self.raw? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    /// Length used by the length rules: characters for scalars, elements
    /// for arrays, keys for objects
    pub fn length(&self) -> Option<usize> {
        match self.raw? {
            Value::Array(items) => Some(items.len()),
            Value::Object(map) => Some(map.len()),
            Value::Null => None,
            _ => self.as_text().map(|text| text.chars().count()),
        }
    }
}

/// Metadata of one uploaded file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Original file name
    #[serde(default)]
    pub name: Option<String>,
    /// Size in bytes
    #[serde(default, deserialize_with = "size_from_value")]
    pub size: Option<u64>,
    /// MIME type reported by the upload
    #[serde(default, alias = "mimeType", alias = "type")]
    pub mimetype: Option<String>,
}

impl FileDescriptor {
    /// Read a descriptor from a JSON value
    ///
    /// Anything that is not an object yields an empty descriptor, which
    /// fails every size and MIME rule.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::deserialize(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

fn size_from_value<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

/// The files supplied for one file field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<FileDescriptor>,
}

impl FileSet {
    /// Normalize a payload value: one object is one file, an array is a
    /// list of files, anything else is no file at all
    pub fn from_value(value: Option<&Value>) -> Self {
        let files = match value {
            Some(obj @ Value::Object(_)) => vec![FileDescriptor::from_value(obj)],
            Some(Value::Array(items)) => items.iter().map(FileDescriptor::from_value).collect(),
            _ => Vec::new(),
        };
        Self { files }
    }

    /// Number of files supplied
    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileDescriptor> + '_ {
        self.files.iter()
    }
}
