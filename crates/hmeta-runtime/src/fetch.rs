use hmeta_reconcile::{decode_export, MetadataSnapshot};
use hmeta_schemas::MetadataRequest;
use hmeta_transport::{Transport, TransportError};

use crate::SnapshotError;

/// One `export_metadata` call, projected onto `source`.
///
/// Errors are reported, never swallowed; degrading to an empty baseline is
/// the caller's decision.
pub async fn fetch_snapshot<T>(transport: &T, source: &str) -> Result<MetadataSnapshot, SnapshotError>
where
    T: Transport + ?Sized,
{
    let payload = serde_json::to_value(MetadataRequest::export_metadata())
        .map_err(|e| SnapshotError::Transport(TransportError::Encode(e.to_string())))?;

    let body = transport
        .post(&payload)
        .await
        .map_err(SnapshotError::Transport)?;

    decode_export(&body, source).map_err(|e| SnapshotError::Decode(e.to_string()))
}
