//! Schema-less payload documents
//!
//! Captured requests and responses are stored as a [`Document`], a tagged
//! variant tree that is independent of any concrete message schema. All
//! structural equality and ignore-path logic in the matcher operates over
//! this type.
//!
//! # Example
//!
//! ```rust
//! use rpcmock_core::document::{Document, IgnoreSet};
//!
//! let captured = Document::from_slice(br#"{"msg":"hi","ts":1}"#)?;
//! let inbound = Document::from_slice(br#"{"ts":2,"msg":"hi"}"#)?;
//!
//! let ignore = IgnoreSet::new(["root.ts"]);
//! assert!(captured.matches(&inbound, &ignore));
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod compare;
pub mod path;

pub use compare::{Mismatch, mismatches, structurally_equal};
pub use path::{IgnorePath, IgnoreSet, ROOT};

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A node of a semi-structured payload tree
#[derive(Debug, Clone, Default)]
pub enum Document {
    /// Absent or explicitly null value
    #[default]
    Null,

    /// Boolean leaf
    Bool(bool),

    /// Numeric leaf, compared numerically
    Number(Number),

    /// String leaf
    String(String),

    /// Mapping with keys kept in sorted order
    Map(BTreeMap<String, Document>),

    /// Ordered sequence
    Seq(Vec<Document>),
}

impl Document {
    /// Decode a document from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode the document as compact JSON bytes
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Build a document from any serializable value
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Document::from)
    }

    /// Decode the document into a typed value
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::from(self.clone()))
    }

    /// Whether this is the null node
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Look up a key of a mapping node
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Short name of the node's variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Map(_) => "map",
            Document::Seq(_) => "sequence",
        }
    }

    /// Structural equality with `other`, skipping any node under `ignore`
    pub fn matches(&self, other: &Document, ignore: &IgnoreSet) -> bool {
        structurally_equal(self, other, ignore)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        structurally_equal(self, other, &IgnoreSet::default())
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => Document::Number(n),
            Value::String(s) => Document::String(s),
            Value::Array(items) => Document::Seq(items.into_iter().map(Document::from).collect()),
            Value::Object(map) => Document::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        match doc {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(b),
            Document::Number(n) => Value::Number(n),
            Document::String(s) => Value::String(s),
            Document::Seq(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Document::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(n) => n.serialize(serializer),
            Document::String(s) => serializer.serialize_str(s),
            Document::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Document::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Document::from)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
