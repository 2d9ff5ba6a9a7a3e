use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ArrayRelationship, Configuration, ObjectRelationship};

/// A database table identified by schema and name.
///
/// This is the lookup key for every per-table map in the workspace, so it is
/// totally ordered and hashable.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// One table the caller wants tracked, with its desired customization and
/// relationships.
///
/// `source` may be left empty in catalog files; the loader stamps the
/// configured source name onto such entries before a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredTable {
    pub table: Table,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub object_relationships: Vec<ObjectRelationship>,
    #[serde(default)]
    pub array_relationships: Vec<ArrayRelationship>,
}

impl DeclaredTable {
    pub fn new(source: impl Into<String>, table: Table) -> Self {
        Self {
            table,
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_enum(mut self, is_enum: bool) -> Self {
        self.is_enum = is_enum;
        self
    }

    pub fn with_object_relationship(mut self, rel: ObjectRelationship) -> Self {
        self.object_relationships.push(rel);
        self
    }

    pub fn with_array_relationship(mut self, rel: ArrayRelationship) -> Self {
        self.array_relationships.push(rel);
        self
    }
}
