use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Table;

/// Relationships are unique by name within a table and direction.
pub trait Named {
    fn name(&self) -> &str;
}

/// Direction of a foreign-key-derived relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Many-to-one.
    Object,
    /// One-to-many.
    Array,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Object => "object",
            RelationshipKind::Array => "array",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Foreign-key columns (object relationships)
// ---------------------------------------------------------------------------

/// Local foreign-key column(s) of an object relationship, as found on the wire.
///
/// The gateway accepts a bare column name or a list for composite keys, and
/// exports whatever shape was stored. Anything else (null, an object form,
/// a missing field) lands in `Other` rather than failing the decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForeignKeyColumns {
    Single(String),
    Composite(Vec<Value>),
    Other(Value),
}

impl Default for ForeignKeyColumns {
    fn default() -> Self {
        ForeignKeyColumns::Other(Value::Null)
    }
}

impl ForeignKeyColumns {
    pub fn single(column: impl Into<String>) -> Self {
        ForeignKeyColumns::Single(column.into())
    }

    pub fn composite<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ForeignKeyColumns::Composite(
            columns
                .into_iter()
                .map(|c| Value::String(c.into()))
                .collect(),
        )
    }

    /// Normalized column list.
    ///
    /// Non-string list elements are dropped and unrecognized shapes yield an
    /// empty list. A malformed value is forwarded as "no columns" and left for
    /// the gateway to reject.
    pub fn columns(&self) -> Vec<String> {
        match self {
            ForeignKeyColumns::Single(c) => vec![c.clone()],
            ForeignKeyColumns::Composite(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            ForeignKeyColumns::Other(_) => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Object relationships
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRelationshipUsing {
    #[serde(default)]
    pub foreign_key_constraint_on: ForeignKeyColumns,
}

/// Many-to-one relationship declared on the table holding the foreign key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRelationship {
    pub name: String,
    #[serde(default)]
    pub using: ObjectRelationshipUsing,
}

impl ObjectRelationship {
    pub fn new(name: impl Into<String>, columns: ForeignKeyColumns) -> Self {
        Self {
            name: name.into(),
            using: ObjectRelationshipUsing {
                foreign_key_constraint_on: columns,
            },
        }
    }
}

impl Named for ObjectRelationship {
    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Array relationships
// ---------------------------------------------------------------------------

/// Foreign key on a remote table pointing back at this one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteForeignKey {
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayRelationshipUsing {
    #[serde(default)]
    pub foreign_key_constraint_on: RemoteForeignKey,
}

/// One-to-many relationship declared on the referenced table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayRelationship {
    pub name: String,
    #[serde(default)]
    pub using: ArrayRelationshipUsing,
}

impl ArrayRelationship {
    pub fn new<I, S>(name: impl Into<String>, remote: Table, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            using: ArrayRelationshipUsing {
                foreign_key_constraint_on: RemoteForeignKey {
                    table: remote,
                    columns: columns.into_iter().map(Into::into).collect(),
                },
            },
        }
    }
}

impl Named for ArrayRelationship {
    fn name(&self) -> &str {
        &self.name
    }
}
