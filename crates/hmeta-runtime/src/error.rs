use std::fmt;

use hmeta_schemas::{RelationshipKind, Table};
use hmeta_transport::TransportError;

// ---------------------------------------------------------------------------
// SnapshotError
// ---------------------------------------------------------------------------

/// Baseline fetch failure. The orchestrator degrades on it; direct callers
/// of [`crate::fetch_snapshot`] decide for themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Transport(TransportError),
    /// 2xx response whose body is not a metadata export.
    Decode(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Transport(e) => write!(f, "fetch metadata: {e}"),
            SnapshotError::Decode(msg) => write!(f, "parse metadata response: {msg}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Transport(e) => Some(e),
            SnapshotError::Decode(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConvergeError
// ---------------------------------------------------------------------------

/// Where in the run a fatal error happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Track,
    Customize,
    Relationships,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Track => "track",
            Phase::Customize => "customize",
            Phase::Relationships => "relationships",
        }
    }
}

/// Fatal run error. Carries enough context to locate the failure without
/// re-running with verbose logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergeError {
    /// `pg_track_table` failed with something other than `already-tracked`.
    Track { table: Table, cause: TransportError },
    /// `pg_set_table_customization` failed for an already-tracked table.
    Customize { table: Table, cause: TransportError },
    /// A relationship create failed with something other than `already-exists`.
    CreateRelationship {
        table: Table,
        kind: RelationshipKind,
        name: String,
        cause: TransportError,
    },
    /// The run was stopped by its shutdown signal.
    Cancelled,
}

impl ConvergeError {
    pub fn table(&self) -> Option<&Table> {
        match self {
            ConvergeError::Track { table, .. }
            | ConvergeError::Customize { table, .. }
            | ConvergeError::CreateRelationship { table, .. } => Some(table),
            ConvergeError::Cancelled => None,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            ConvergeError::Track { .. } => Some(Phase::Track),
            ConvergeError::Customize { .. } => Some(Phase::Customize),
            ConvergeError::CreateRelationship { .. } => Some(Phase::Relationships),
            ConvergeError::Cancelled => None,
        }
    }

    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            ConvergeError::Track { cause, .. }
            | ConvergeError::Customize { cause, .. }
            | ConvergeError::CreateRelationship { cause, .. } => Some(cause),
            ConvergeError::Cancelled => None,
        }
    }
}

impl fmt::Display for ConvergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergeError::Track { table, cause } => {
                write!(f, "track table {table}: {cause}")
            }
            ConvergeError::Customize { table, cause } => {
                write!(f, "update customization for table {table}: {cause}")
            }
            ConvergeError::CreateRelationship {
                table,
                kind,
                name,
                cause,
            } => write!(
                f,
                "create {kind} relationship {name} for table {table}: {cause}"
            ),
            ConvergeError::Cancelled => write!(f, "metadata convergence cancelled"),
        }
    }
}

impl std::error::Error for ConvergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.transport_error()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_error_names_table_and_relationship() {
        let err = ConvergeError::CreateRelationship {
            table: Table::new("storage", "files"),
            kind: RelationshipKind::Object,
            name: "bucket".to_string(),
            cause: TransportError::Unexpected {
                status: 500,
                body: "boom".to_string(),
            },
        };

        assert_eq!(
            err.to_string(),
            "create object relationship bucket for table storage.files: \
             unexpected gateway response status=500 body=boom"
        );
        assert_eq!(err.phase(), Some(Phase::Relationships));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn cancelled_has_no_table() {
        assert_eq!(ConvergeError::Cancelled.table(), None);
        assert_eq!(ConvergeError::Cancelled.phase(), None);
    }
}
