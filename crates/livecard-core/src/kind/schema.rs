//! Tolerant-reader parsing of untyped JSON records into typed schemas.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Wire type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    /// Integer constrained to `0..=100`.
    Percent,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Percent => "an integer between 0 and 100",
        };
        f.write_str(s)
    }
}

/// One entry of a schema's field contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
        }
    }
}

/// Why a record failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("payload must be an object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("missing required field {field:?}")]
    Missing { field: String },

    #[error("field {field:?} must be {expected}")]
    WrongType { field: String, expected: FieldType },

    #[error("field {field:?} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("could not encode record: {0}")]
    Encode(String),
}

impl FieldError {
    /// The offending field, when the error is about one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Missing { field }
            | Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. } => Some(field.as_str()),
            Self::NotAnObject { .. } | Self::Encode(_) => None,
        }
    }
}

/// A typed record with a static field contract.
///
/// `FIELDS` is authoritative: [`parse`] validates every listed field in
/// order before `read` runs, so `read` only extracts.
pub trait Schema: Serialize + Sized + Send + Sync + 'static {
    const FIELDS: &'static [FieldSpec];

    fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError>;
}

/// Parse an untyped payload into the schema `S`.
pub fn parse<S: Schema>(value: &Value) -> Result<S, FieldError> {
    let reader = FieldReader::new(value)?;
    reader.check(S::FIELDS)?;
    S::read(&reader)
}

/// Parse `value` as `S` and re-encode it, dropping unknown keys and
/// absent optionals.
pub fn normalize<S: Schema>(value: &Value) -> Result<Value, FieldError> {
    let record = parse::<S>(value)?;
    encode(&record)
}

/// Encode a typed record into the untyped form handed to the host.
pub fn encode<S: Schema>(record: &S) -> Result<Value, FieldError> {
    serde_json::to_value(record).map_err(|e| FieldError::Encode(e.to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read-only view over a JSON object.
///
/// `null` is treated the same as an absent key.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub fn new(value: &'a Value) -> Result<Self, FieldError> {
        match value {
            Value::Object(object) => Ok(Self { object }),
            other => Err(FieldError::NotAnObject {
                found: json_type_name(other),
            }),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.object.get(name).filter(|v| !v.is_null())
    }

    /// Validate presence and type of every field in `fields`, in order.
    pub fn check(&self, fields: &[FieldSpec]) -> Result<(), FieldError> {
        for spec in fields {
            match self.get(spec.name) {
                None if spec.required => {
                    return Err(FieldError::Missing {
                        field: spec.name.to_string(),
                    });
                }
                None => {}
                Some(value) => check_type(spec, value)?,
            }
        }
        Ok(())
    }

    pub fn required_str(&self, name: &str) -> Result<String, FieldError> {
        self.optional_str(name)?.ok_or_else(|| missing(name))
    }

    pub fn optional_str(&self, name: &str) -> Result<Option<String>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(name, FieldType::String)),
        }
    }

    pub fn required_int(&self, name: &str) -> Result<i64, FieldError> {
        self.optional_int(name)?.ok_or_else(|| missing(name))
    }

    pub fn optional_int(&self, name: &str) -> Result<Option<i64>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => as_integer(value)
                .map(Some)
                .ok_or_else(|| wrong_type(name, FieldType::Integer)),
        }
    }

    pub fn optional_number(&self, name: &str) -> Result<Option<f64>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| wrong_type(name, FieldType::Number)),
        }
    }

    pub fn optional_percent(&self, name: &str) -> Result<Option<u8>, FieldError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let n = as_integer(value).ok_or_else(|| wrong_type(name, FieldType::Percent))?;
        percent(name, n).map(Some)
    }
}

fn check_type(spec: &FieldSpec, value: &Value) -> Result<(), FieldError> {
    let ok = match spec.ty {
        FieldType::String => value.is_string(),
        FieldType::Integer => as_integer(value).is_some(),
        FieldType::Number => value.is_number(),
        FieldType::Percent => {
            let n = as_integer(value).ok_or_else(|| wrong_type(spec.name, spec.ty))?;
            percent(spec.name, n)?;
            true
        }
    };
    if ok {
        Ok(())
    } else {
        Err(wrong_type(spec.name, spec.ty))
    }
}

/// JS callers send every number as a double, so `10.0` counts as an integer.
/// Values outside `i64` are rejected, never clamped.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.is_u64() {
        return None;
    }
    let f = value.as_f64()?;
    // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn percent(name: &str, n: i64) -> Result<u8, FieldError> {
    u8::try_from(n)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| FieldError::OutOfRange {
            field: name.to_string(),
            value: n,
            min: 0,
            max: 100,
        })
}

fn missing(name: &str) -> FieldError {
    FieldError::Missing {
        field: name.to_string(),
    }
}

fn wrong_type(name: &str, expected: FieldType) -> FieldError {
    FieldError::WrongType {
        field: name.to_string(),
        expected,
    }
}
