use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A record as the document store reports it: the backend-assigned id plus
/// the stored fields. The id is not one of the stored fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// An entity decoded from one collection record.
pub trait Document: Sized {
    /// Field name the backend id is merged under before decoding.
    const ID_FIELD: &'static str;

    fn decode(id: &str, fields: Map<String, Value>) -> Result<Self, serde_json::Error>;
}

/// Merge `id` into `fields` under `id_field` and deserialize the result.
///
/// The backend id always wins over a stored field of the same name.
pub fn decode_with_id<T: DeserializeOwned>(
    id_field: &str,
    id: &str,
    mut fields: Map<String, Value>,
) -> Result<T, serde_json::Error> {
    fields.insert(id_field.to_string(), Value::String(id.to_string()));
    serde_json::from_value(Value::Object(fields))
}

// Stored documents are written by several clients and are not schema
// checked. The helpers below accept whatever shape a field turns up in so
// that one odd field never hides the whole record from the snapshot.

/// Strings stay as they are, numbers and other scalars are rendered as
/// text, null and missing become `None`.
pub fn free_form<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Like [`free_form`], with an empty string for null or missing
pub fn free_form_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(free_form(deserializer)?.unwrap_or_default())
}

/// Truthiness of any JSON value: null, false, 0 and "" are false
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    })
}

/// String entries of an array; anything else is an empty list
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
