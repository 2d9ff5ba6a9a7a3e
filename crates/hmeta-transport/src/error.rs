use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Idempotent markers
// ---------------------------------------------------------------------------

/// Error codes meaning "the requested change already holds".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdempotentMarker {
    /// `pg_track_table` on a table that is already tracked.
    AlreadyTracked,
    /// `pg_create_*_relationship` on a relationship that already exists.
    AlreadyExists,
}

impl IdempotentMarker {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "already-tracked" => Some(IdempotentMarker::AlreadyTracked),
            "already-exists" => Some(IdempotentMarker::AlreadyExists),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            IdempotentMarker::AlreadyTracked => "already-tracked",
            IdempotentMarker::AlreadyExists => "already-exists",
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway error body
// ---------------------------------------------------------------------------

/// Structured error body the gateway returns with non-2xx statuses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub code: String,
}

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The request payload could not be encoded.
    Encode(String),
    /// The request could not be sent or the response could not be read.
    Request(String),
    /// The gateway answered with a recognized idempotent marker.
    Conflict {
        marker: IdempotentMarker,
        message: String,
    },
    /// The gateway answered with a structured error that is not a marker.
    Gateway { status: u16, error: GatewayError },
    /// Non-2xx status with a body that is not a structured error.
    Unexpected { status: u16, body: String },
}

impl TransportError {
    /// `Some` only for recognized idempotent markers. Everything else is a
    /// hard failure.
    pub fn idempotent_marker(&self) -> Option<IdempotentMarker> {
        match self {
            TransportError::Conflict { marker, .. } => Some(*marker),
            _ => None,
        }
    }

    pub fn is_marker(&self, marker: IdempotentMarker) -> bool {
        self.idempotent_marker() == Some(marker)
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Gateway { status, .. } | TransportError::Unexpected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Encode(msg) => write!(f, "encode request: {msg}"),
            TransportError::Request(msg) => write!(f, "transport error: {msg}"),
            TransportError::Conflict { marker, message } => {
                write!(f, "gateway conflict {}: {message}", marker.code())
            }
            TransportError::Gateway { status, error } if error.code.is_empty() => {
                write!(f, "gateway error status={status}: {}", error.error)
            }
            TransportError::Gateway { status, error } => write!(
                f,
                "gateway error status={status} code={}: {}",
                error.code, error.error
            ),
            TransportError::Unexpected { status, body } => {
                write!(f, "unexpected gateway response status={status} body={body}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Classify a received response.
///
/// Pure so the rules can be tested without a server:
/// - 2xx: the raw body.
/// - non-2xx with a JSON object body: a marker when `code` is recognized,
///   otherwise a gateway error (empty `code` included).
/// - non-2xx with anything else: unexpected, carrying the body text.
pub fn classify_response(status: u16, body: &[u8]) -> Result<Vec<u8>, TransportError> {
    if (200..300).contains(&status) {
        return Ok(body.to_vec());
    }

    let structured = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .filter(serde_json::Value::is_object)
        .and_then(|v| serde_json::from_value::<GatewayError>(v).ok());

    match structured {
        Some(error) => match IdempotentMarker::from_code(&error.code) {
            Some(marker) => Err(TransportError::Conflict {
                marker,
                message: error.error,
            }),
            None => Err(TransportError::Gateway { status, error }),
        },
        None => Err(TransportError::Unexpected {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }),
    }
}
