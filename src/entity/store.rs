use crate::{err::Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Number, Value};

/// Type coercion applied to a property on every read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    Int,
    Float,
    String,
    Bool,
    /// Stored as `"true"`/`"false"`, surfaced as a native boolean.
    BooleanString,
    Object,
    Json,
    DateTime,
}

impl Cast {
    /// Looks up a cast by its tag, accepting the usual aliases.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "int" | "integer" => Some(Self::Int),
            "float" | "double" | "real" => Some(Self::Float),
            "string" => Some(Self::String),
            "bool" | "boolean" => Some(Self::Bool),
            "boolean_string" => Some(Self::BooleanString),
            "object" => Some(Self::Object),
            "array" | "json" => Some(Self::Json),
            "datetime" => Some(Self::DateTime),
            _ => None,
        }
    }

    fn read(self, value: &Value) -> Value {
        match self {
            Self::Int => Value::from(to_f64(value).map_or(0, |n| n.trunc() as i64)),
            Self::Float => Value::from(to_f64(value).unwrap_or(0.0)),
            Self::String => Value::String(stringify(value)),
            Self::Bool => Value::Bool(truthy(value)),
            Self::BooleanString => Value::Bool(value.as_str() == Some("true")),
            Self::Object | Self::Json => match value {
                Value::String(raw) => serde_json::from_str(raw).unwrap_or(Value::Null),
                other => other.clone(),
            },
            Self::DateTime => match to_datetime(value) {
                Some(dt) => Value::String(format_datetime(&dt)),
                None => value.clone(),
            },
        }
    }

    /// Structured values are only accepted by the object casts. Scalars
    /// always coerce.
    fn write(self, name: &str, value: Value) -> Result<Value> {
        match (self, value) {
            (Self::Object | Self::Json, value) => Ok(value),
            (_, value @ (Value::Array(_) | Value::Object(_))) => {
                Err(mismatch(name, "a scalar", &value))
            }
            (cast, value) => Ok(cast.coerce(value)),
        }
    }

    /// Write coercion of a scalar. Non-numeric values become zero and
    /// unparsable dates are kept as given.
    fn coerce(self, value: Value) -> Value {
        match self {
            Self::Int => Value::from(to_f64(&value).map_or(0, |n| n.trunc() as i64)),
            Self::Float => Number::from_f64(to_f64(&value).unwrap_or(0.0))
                .map_or_else(|| Value::from(0.0), Value::Number),
            Self::String => Value::String(stringify(&value)),
            Self::Bool => Value::Bool(truthy(&value)),
            Self::BooleanString => Value::String(bool_string(truthy(&value)).into()),
            Self::Object | Self::Json => value,
            Self::DateTime => match to_datetime(&value) {
                Some(dt) => Value::String(format_datetime(&dt)),
                None => value,
            },
        }
    }
}

/// A wire scalar handed to a typed setter. It can only be built from
/// strings, booleans and integers, so writing one always succeeds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Scalar(Value);

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self(Value::Bool(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

/// Typed key/value bag with a snapshot of the last synced state.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyStore {
    properties: Map<String, Value>,
    original: Map<String, Value>,
    casts: &'static [(&'static str, Cast)],
}

impl PropertyStore {
    pub fn new(casts: &'static [(&'static str, Cast)]) -> Self {
        Self {
            properties: Map::new(),
            original: Map::new(),
            casts,
        }
    }

    pub fn cast_of(&self, name: &str) -> Option<Cast> {
        self.casts
            .iter()
            .find(|(prop, _)| *prop == name)
            .map(|(_, cast)| *cast)
    }

    /// Coerced value of `name`, or `None` if it is not set.
    pub fn get(&self, name: &str) -> Option<Value> {
        let raw = self.properties.get(name)?;
        if raw.is_null() {
            return Some(Value::Null);
        }
        Some(match self.cast_of(name) {
            Some(cast) => cast.read(raw),
            None => raw.clone(),
        })
    }

    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.get(name).unwrap_or(default)
    }

    /// The stored value, without any read cast.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Stores `value` after its write cast. Properties without a cast are wire
    /// strings, so structured values are rejected for them.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let stored = match (self.cast_of(name), value) {
            (_, Value::Null) => Value::Null,
            (Some(cast), value) => cast.write(name, value)?,
            (None, value @ (Value::Array(_) | Value::Object(_))) => {
                return Err(mismatch(name, "a scalar", &value));
            }
            (None, value) => value,
        };

        self.properties.insert(name.to_string(), stored);
        Ok(())
    }

    /// Writes a scalar through the property's cast.
    pub(crate) fn put(&mut self, name: &str, value: Scalar) {
        let stored = match self.cast_of(name) {
            Some(cast) => cast.coerce(value.0),
            None => value.0,
        };
        self.properties.insert(name.to_string(), stored);
    }

    /// Writes a float. NaN and infinities have no wire form.
    pub(crate) fn put_f64(&mut self, name: &str, value: f64) -> Result<()> {
        let number = Number::from_f64(value).ok_or_else(|| {
            Error::TypeMismatch(format!("property '{name}' expects a finite number, got {value}"))
        })?;
        self.set(name, Value::Number(number))
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.properties.shift_remove(name)
    }

    pub fn clear(&mut self) {
        self.properties.clear();
    }

    /// Snapshots the current properties as the clean state.
    pub fn sync_original(&mut self) {
        self.original = self.properties.clone();
    }

    pub fn original(&self) -> &Map<String, Value> {
        &self.original
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Properties whose value changed since the last sync.
    pub fn dirty(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .filter(|(name, value)| match self.original.get(name.as_str()) {
                Some(original) => !equivalent(value, original),
                None => true,
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty().is_empty()
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(stringify(&other)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).filter(|v| !v.is_null()).map(|v| truthy(&v))
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| to_f64(&v))
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get_f64(name).map(|n| n.trunc() as i64)
    }

    pub fn get_datetime(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        self.raw(name).and_then(to_datetime)
    }
}

fn mismatch(name: &str, expected: &str, value: &Value) -> Error {
    Error::TypeMismatch(format!("property '{name}' expects {expected}, got {value}"))
}

pub(crate) fn bool_string(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Wire form of a scalar. Whole floats are written without a fraction.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => bool_string(*b).to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Empty strings, `"0"`, `"false"`, zero, empty collections and null are false.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

pub(crate) fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(|f| f.is_finite()),
        _ => false,
    }
}

/// Equality that treats a number and its string form as the same value.
fn equivalent(current: &Value, original: &Value) -> bool {
    if current == original {
        return true;
    }
    if is_numeric(current) && is_numeric(original) {
        return to_f64(current) == to_f64(original);
    }
    false
}

/// Numbers are Unix timestamps, strings are RFC 3339 or `Y-m-d[ H:M:S]` in UTC.
pub(crate) fn to_datetime(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64()?;
            Utc.timestamp_opt(secs.trunc() as i64, 0)
                .single()
                .map(DateTime::<FixedOffset>::from)
        }
        Value::String(s) => parse_datetime(s.trim()),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt);
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(Utc.from_utc_datetime(&naive).into())
}

/// ISO-8601 with an explicit offset, e.g. `2024-05-01T10:00:00+00:00`.
pub(crate) fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}
