//! Dynamic message values.
//!
//! Compiled validators run in-process against [`Message`] values. The model
//! follows proto3 JSON: wrappers are bare scalars or `null`, embedded
//! messages are objects, repeated fields are arrays. 64-bit integers may be
//! written as decimal strings and non-finite floats as `"NaN"`,
//! `"Infinity"` or `"-Infinity"`; the numeric accessors read both forms. Conversions to and from
//! [`serde_json::Value`] let instances be read from and written back to JSON.

use std::collections::BTreeMap;

/// A dynamic value held by a message field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Message(Message),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widens any integer to `i128` so signed and unsigned compare exactly.
    ///
    /// Decimal strings are accepted within the 64-bit range.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(n) => Some(i128::from(*n)),
            Value::UInt(n) => Some(i128::from(*n)),
            Value::String(s) => {
                let n = s.parse::<i128>().ok()?;
                (i128::from(i64::MIN)..=i128::from(u64::MAX))
                    .contains(&n)
                    .then_some(n)
            }
            _ => None,
        }
    }

    /// Reads a float; integers are accepted since JSON writes `2.0` as `2`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            Value::UInt(n) => Some(*n as f64),
            Value::String(s) => match s.as_str() {
                "NaN" => Some(f64::NAN),
                "Infinity" => Some(f64::INFINITY),
                "-Infinity" => Some(f64::NEG_INFINITY),
                // Rust also parses "inf" and "nan"; those are not numeric strings here.
                other if other.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => None,
                other => other.parse().ok(),
            },
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Converts to JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::UInt(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Message(m) => m.to_json(),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Objects become messages; a map field holding an object is never
    /// inspected, so the distinction does not matter for validation.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Message(Message::from_json_fields(fields)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::UInt(u64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Value::Message(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A dynamic message: field values by name.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::{Message, Value};
///
/// let person = Message::new()
///     .with("name", "Ada")
///     .with("age", 36)
///     .with("tags", vec!["math", "engines"]);
///
/// assert_eq!(person.get("name").and_then(Value::as_str), Some("Ada"));
/// assert_eq!(person.to_json()["tags"][1], "engines");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: BTreeMap<String, Value>,
}

impl Message {
    /// Creates a message with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Iterates over set fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads a message from a JSON document.
    ///
    /// Returns `Ok(None)` for `null`, which validates as an absent message,
    /// and `Err` with the offending value for any other non-object.
    pub fn from_json(json: serde_json::Value) -> Result<Option<Message>, serde_json::Value> {
        match json {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Object(fields) => Ok(Some(Message::from_json_fields(fields))),
            other => Err(other),
        }
    }

    fn from_json_fields(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        }
    }

    /// Converts to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}
