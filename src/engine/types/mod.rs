use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

/// Identifies one series inside a shard. Derived from the stable hash of
/// the entity key; see the series directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesId(pub u64);

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShardId(pub u32);

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sort direction for seeker ordering and the merge comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sort {
    Asc,
    Desc,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Asc => "ASC",
            Sort::Desc => "DESC",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag value as stored and as returned in query output.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Null,
    Str(String),
    Int(i64),
    StrArray(Vec<String>),
    IntArray(Vec<i64>),
    Binary(Vec<u8>),
}

impl TagValue {
    /// Canonical storage encoding. Ints are 8-byte big-endian with the
    /// sign bit flipped so byte order matches numeric order; strings are
    /// raw UTF-8; arrays expand to one encoded value per element.
    pub fn bytes(&self) -> Vec<Vec<u8>> {
        match self {
            TagValue::Null => Vec::new(),
            TagValue::Str(s) => vec![s.as_bytes().to_vec()],
            TagValue::Int(i) => vec![encode_int(*i).to_vec()],
            TagValue::StrArray(items) => {
                items.iter().map(|s| s.as_bytes().to_vec()).collect()
            }
            TagValue::IntArray(items) => {
                items.iter().map(|i| encode_int(*i).to_vec()).collect()
            }
            TagValue::Binary(b) => vec![b.clone()],
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TagValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TagValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            TagValue::Null => JsonValue::Null,
            TagValue::Str(s) => JsonValue::String(s.clone()),
            TagValue::Int(i) => JsonValue::Number(Number::from(*i)),
            TagValue::StrArray(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
            TagValue::IntArray(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|i| JsonValue::Number(Number::from(*i)))
                    .collect(),
            ),
            TagValue::Binary(bytes) => JsonValue::String(BASE64_STANDARD.encode(bytes)),
        }
    }
}

/// Order-preserving big-endian encoding for signed 64-bit values.
pub fn encode_int(v: i64) -> [u8; 8] {
    ((v as u64) ^ (1u64 << 63)).to_be_bytes()
}

pub fn decode_int(bytes: [u8; 8]) -> i64 {
    (u64::from_be_bytes(bytes) ^ (1u64 << 63)) as i64
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Null => f.write_str("null"),
            TagValue::Str(s) => write!(f, "{}", s),
            TagValue::Int(i) => write!(f, "{}", i),
            TagValue::StrArray(items) => write!(f, "[{}]", items.join(",")),
            TagValue::IntArray(items) => {
                let joined: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", joined.join(","))
            }
            TagValue::Binary(bytes) => write!(f, "{}", BASE64_STANDARD.encode(bytes)),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Str(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<Vec<&str>> for TagValue {
    fn from(value: Vec<&str>) -> Self {
        TagValue::StrArray(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for TagValue {
    fn from(value: Vec<i64>) -> Self {
        TagValue::IntArray(value)
    }
}

impl From<JsonValue> for TagValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => TagValue::Null,
            JsonValue::Bool(b) => TagValue::Str(b.to_string()),
            JsonValue::Number(num) => num
                .as_i64()
                .map(TagValue::Int)
                .unwrap_or_else(|| TagValue::Str(num.to_string())),
            JsonValue::String(s) => TagValue::Str(s),
            JsonValue::Array(items) => {
                if items.iter().all(|v| v.is_i64()) {
                    TagValue::IntArray(items.iter().filter_map(|v| v.as_i64()).collect())
                } else {
                    TagValue::StrArray(
                        items
                            .into_iter()
                            .map(|v| match v {
                                JsonValue::String(s) => s,
                                other => other.to_string(),
                            })
                            .collect(),
                    )
                }
            }
            JsonValue::Object(_) => TagValue::Str(value.to_string()),
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TagValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(TagValue::from(json))
    }
}

/// One projected tag in a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: TagValue,
}

/// A named group of tags, as laid out by the stream schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagFamily {
    pub name: String,
    pub tags: Vec<Tag>,
}

/// One output record of a scan, emitted in merge order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub element_id: Vec<u8>,
    /// Nanoseconds since the epoch.
    pub timestamp: i64,
    pub tag_families: Vec<TagFamily>,
}
