use super::FirestoreError;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

/// A Firestore value in its REST wire form (`{"stringValue": "..."}`, ...).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(flatten)]
    pub value_type: ValueType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    StringValue(String),
    IntegerValue(String), // int64 travels as a decimal string
    DoubleValue(f64),
    BooleanValue(bool),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
    NullValue(()),
    TimestampValue(String),
    GeoPointValue(GeoPoint),
    BytesValue(String),
    ReferenceValue(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

impl Value {
    /// Converts plain JSON into a Firestore value.
    pub fn from_json(value: JsonValue) -> Result<Self, FirestoreError> {
        let value_type = match value {
            JsonValue::Null => ValueType::NullValue(()),
            JsonValue::Bool(b) => ValueType::BooleanValue(b),
            JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => ValueType::IntegerValue(i.to_string()),
                (None, Some(f)) => ValueType::DoubleValue(f),
                (None, None) => {
                    return Err(FirestoreError::SerializationError(serde_json::Error::custom(
                        format!("Unsupported number: {}", n),
                    )))
                }
            },
            JsonValue::String(s) => ValueType::StringValue(s),
            JsonValue::Array(items) => ValueType::ArrayValue(ArrayValue {
                values: items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_, _>>()?,
            }),
            JsonValue::Object(object) => ValueType::MapValue(MapValue {
                fields: fields_from_object(object)?,
            }),
        };
        Ok(Value { value_type })
    }

    /// Converts the value into plain JSON. Timestamps, bytes and references
    /// become strings; geo points become `{latitude, longitude}` objects.
    pub fn into_json(self) -> Result<JsonValue, FirestoreError> {
        Ok(match self.value_type {
            ValueType::StringValue(s)
            | ValueType::TimestampValue(s)
            | ValueType::BytesValue(s)
            | ValueType::ReferenceValue(s) => JsonValue::String(s),
            ValueType::IntegerValue(s) => {
                let i: i64 = s.parse().map_err(|e| {
                    serde_json::Error::custom(format!("Failed to parse integer string '{}': {}", s, e))
                })?;
                JsonValue::from(i)
            }
            ValueType::DoubleValue(d) => serde_json::Number::from_f64(d)
                .map(JsonValue::Number)
                .ok_or_else(|| serde_json::Error::custom(format!("Invalid f64 value: {}", d)))?,
            ValueType::BooleanValue(b) => JsonValue::Bool(b),
            ValueType::MapValue(map) => fields_into_json(map.fields)?,
            ValueType::ArrayValue(array) => JsonValue::Array(
                array
                    .values
                    .into_iter()
                    .map(Value::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            ValueType::NullValue(()) => JsonValue::Null,
            ValueType::GeoPointValue(point) => {
                serde_json::json!({ "latitude": point.latitude, "longitude": point.longitude })
            }
        })
    }
}

fn fields_from_object(object: Map<String, JsonValue>) -> Result<HashMap<String, Value>, FirestoreError> {
    object
        .into_iter()
        .map(|(k, v)| Value::from_json(v).map(|v| (k, v)))
        .collect()
}

pub(crate) fn fields_into_json(fields: HashMap<String, Value>) -> Result<JsonValue, FirestoreError> {
    let object = fields
        .into_iter()
        .map(|(k, v)| v.into_json().map(|v| (k, v)))
        .collect::<Result<Map<_, _>, FirestoreError>>()?;
    Ok(JsonValue::Object(object))
}

/// Serializes `value` into a document field map. Only objects can be documents.
pub(crate) fn fields_from_serializable<T: Serialize>(value: &T) -> Result<HashMap<String, Value>, FirestoreError> {
    match serde_json::to_value(value)? {
        JsonValue::Object(object) => fields_from_object(object),
        _ => Err(FirestoreError::SerializationError(serde_json::Error::custom(
            "Can only set objects as documents",
        ))),
    }
}
