//! Hierarchical store model and snapshot access
//!
//! The store is a tree of named nodes. Any node may carry a typed dataset
//! payload; record-bearing nodes are recognised later by their names (see
//! [`crate::record`]). Readers obtain a fresh [`Node`] snapshot through
//! [`TreeSource::open_root`] on every invocation, so a writer appending to the
//! store between calls is picked up by simply opening again.

use crate::error::{InspectError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Suffix the writer appends to compound member names (`channel_name`)
pub const MEMBER_SUFFIX: &str = "_name";

/// A scalar or variable-length cell of a dataset row
///
/// Anything that is not a number, string or array lands in `Other`, so a
/// single odd cell never stops the snapshot from loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    Sequence(Vec<Value>),
    Other(serde_json::Value),
}

impl Value {
    /// True for numbers and strings
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) | Value::Text(_)
        )
    }

    /// Elements of a sequence, None for scalars
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Unsigned(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Other(v) => write!(f, "{v}"),
        }
    }
}

/// One dataset row, either a compound record or a positional array
///
/// Compound members keep the order they were stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Row {
    #[serde(with = "ordered_members")]
    Compound(Vec<(String, Value)>),
    Flat(Vec<Value>),
    Malformed(serde_json::Value),
}

impl Row {
    /// Look up a compound member by its bare name or the writer's
    /// `<name>_name` member name
    pub fn field(&self, name: &str) -> Option<&Value> {
        let Row::Compound(members) = self else {
            return None;
        };
        let suffixed = format!("{name}{MEMBER_SUFFIX}");
        let lookup = |wanted: &str| {
            members
                .iter()
                .find(|(member, _)| member == wanted)
                .map(|(_, value)| value)
        };
        lookup(name).or_else(|| lookup(&suffixed))
    }

    /// Positional access: array index for flat rows, stored member order
    /// for compound rows
    pub fn position(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Flat(values) => values.get(index),
            Row::Compound(members) => members.get(index).map(|(_, value)| value),
            Row::Malformed(_) => None,
        }
    }
}

/// Compound members as a JSON object, read back in document order
mod ordered_members {
    use super::Value as Cell;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        members: &[(String, Cell)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(members.len()))?;
        for (name, value) in members {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Cell)>, D::Error> {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = Vec<(String, Cell)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a compound row object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut members = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, Cell>()? {
                    members.push(entry);
                }
                Ok(members)
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

/// Typed array payload of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Dataset shape: `[rows]` for compound data, `[rows, columns]` for flat arrays
    pub fn shape(&self) -> Vec<usize> {
        match self.rows.first() {
            Some(Row::Flat(values)) => vec![self.rows.len(), values.len()],
            _ => vec![self.rows.len()],
        }
    }

    /// Leading dimension of the shape
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A named tree node with ordered children and an optional payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(
        default,
        deserialize_with = "lenient_payload",
        skip_serializing_if = "Option::is_none"
    )]
    pub payload: Option<Dataset>,
}

/// A payload that is not a dataset object is dropped and the node loads as
/// a plain container.
fn lenient_payload<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Dataset>, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value::<Option<Dataset>>(raw) {
        Ok(payload) => Ok(payload),
        Err(err) => {
            trace!(error = %err, "unreadable payload dropped");
            Ok(None)
        }
    }
}

impl Node {
    /// Container node with the given children
    pub fn group(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            children,
            payload: None,
        }
    }

    /// Leaf node carrying a dataset
    pub fn dataset(name: impl Into<String>, payload: Dataset) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            payload: Some(payload),
        }
    }

    /// Children paired with their names, in stored order
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|c| (c.name.as_str(), c))
    }

    /// Total number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

/// Source of fresh root snapshots
pub trait TreeSource {
    /// Open the store and return its root node
    fn open_root(&self) -> Result<Node>;

    /// Human-readable location for diagnostics
    fn location(&self) -> String;
}

impl TreeSource for Node {
    fn open_root(&self) -> Result<Node> {
        Ok(self.clone())
    }

    fn location(&self) -> String {
        format!("<memory:{}>", self.name)
    }
}

/// A JSON snapshot of the hierarchy on disk
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `root` as a snapshot at `path`
    pub fn write(path: &Path, root: &Node) -> Result<()> {
        let json = serde_json::to_string_pretty(root).map_err(|e| InspectError::OutputWrite {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, json).map_err(|source| InspectError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl TreeSource for SnapshotFile {
    fn open_root(&self) -> Result<Node> {
        let store_err = |reason: String| InspectError::StoreOpen {
            path: self.path.clone(),
            reason,
        };

        let text = std::fs::read_to_string(&self.path).map_err(|e| store_err(e.to_string()))?;
        let root: Node = serde_json::from_str(&text).map_err(|e| store_err(e.to_string()))?;

        debug!(path = %self.path.display(), nodes = root.node_count(), "opened snapshot");
        Ok(root)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
