use std::future::Future;

use hmeta_config::GatewayConfig;
use hmeta_reconcile::{
    customization_plan, relationship_plan, CustomizationPlan, MergeOutcome, MetadataSnapshot,
};
use hmeta_schemas::{DeclaredTable, MetadataRequest, RelationshipKind};
use hmeta_transport::{HttpTransport, IdempotentMarker, Transport, TransportError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{fetch_snapshot, ConvergeError, SnapshotError};

/// Outcome counters of one successful run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConvergeReport {
    /// The baseline fetch failed and the run used an empty snapshot.
    pub baseline_degraded: bool,
    /// Tables of the configured source present in the baseline.
    pub baseline_tables: usize,
    /// Baseline entries of the configured source that could not be read.
    pub baseline_skipped_entries: usize,
    pub tables_tracked: usize,
    pub tables_already_tracked: usize,
    pub tables_customized: usize,
    /// Stored configurations that did not parse and were overwritten.
    pub unparseable_configurations: usize,
    pub relationships_created: usize,
    /// Relationship creates the gateway answered with `already-exists`.
    pub relationships_already_present: usize,
}

impl ConvergeReport {
    /// `true` when the run changed nothing beyond re-applying customizations.
    pub fn is_noop(&self) -> bool {
        self.tables_tracked == 0 && self.relationships_created == 0
    }
}

/// Drives one convergence run against a single gateway source.
///
/// Holds no mutable state between runs; the gateway is the only source of
/// truth. Independent sources need independent reconcilers.
#[derive(Debug)]
pub struct Reconciler<T> {
    transport: T,
    source: String,
}

impl Reconciler<HttpTransport> {
    pub fn from_config(cfg: &GatewayConfig) -> Result<Self, TransportError> {
        Ok(Self::new(HttpTransport::new(cfg)?, cfg.source()))
    }
}

impl<T: Transport> Reconciler<T> {
    /// `source` selects which export entries form the baseline.
    pub fn new(transport: T, source: impl Into<String>) -> Self {
        Self {
            transport,
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_snapshot(&self) -> Result<MetadataSnapshot, SnapshotError> {
        fetch_snapshot(&self.transport, &self.source).await
    }

    /// Converge the gateway toward `tables`, in the given order.
    ///
    /// Safe to repeat: a second run over the same state only re-confirms
    /// tracked tables and existing relationships.
    pub async fn converge(&self, tables: &[DeclaredTable]) -> Result<ConvergeReport, ConvergeError> {
        let mut report = ConvergeReport::default();

        let baseline = match self.fetch_snapshot().await {
            Ok(snapshot) => {
                debug!(source = %self.source, tables = snapshot.len(), "fetched metadata baseline");
                for skipped in &snapshot.skipped {
                    warn!(
                        source = %self.source,
                        index = skipped.index,
                        error = %skipped.reason,
                        "skipping unreadable table entry in metadata baseline"
                    );
                }
                report.baseline_tables = snapshot.len();
                report.baseline_skipped_entries = snapshot.skipped.len();
                snapshot
            }
            Err(err) => {
                warn!(
                    source = %self.source,
                    error = %err,
                    "failed to fetch existing metadata, will overwrite configurations"
                );
                report.baseline_degraded = true;
                MetadataSnapshot::empty()
            }
        };

        for declared in tables {
            self.track_or_customize(declared, &baseline, &mut report)
                .await?;
        }

        for declared in tables {
            self.create_relationships(declared, &baseline, &mut report)
                .await?;
        }

        info!(
            source = %self.source,
            tracked = report.tables_tracked,
            customized = report.tables_customized,
            relationships = report.relationships_created,
            degraded = report.baseline_degraded,
            "metadata converged"
        );

        Ok(report)
    }

    /// [`Reconciler::converge`], abandoned as soon as `shutdown` completes.
    ///
    /// The in-flight request is dropped and nothing further is sent.
    pub async fn converge_until<F>(
        &self,
        tables: &[DeclaredTable],
        shutdown: F,
    ) -> Result<ConvergeReport, ConvergeError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            res = self.converge(tables) => res,
            () = shutdown => {
                warn!(source = %self.source, "metadata convergence cancelled");
                Err(ConvergeError::Cancelled)
            }
        }
    }

    async fn send(&self, req: &MetadataRequest) -> Result<Vec<u8>, TransportError> {
        let payload =
            serde_json::to_value(req).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.transport.post(&payload).await
    }

    // -----------------------------------------------------------------------
    // Phase A
    // -----------------------------------------------------------------------

    async fn track_or_customize(
        &self,
        declared: &DeclaredTable,
        baseline: &MetadataSnapshot,
        report: &mut ConvergeReport,
    ) -> Result<(), ConvergeError> {
        let table = &declared.table;

        match self.send(&MetadataRequest::track_table(declared)).await {
            Ok(_) => {
                info!(table = %table, "tracked table");
                report.tables_tracked += 1;
                Ok(())
            }
            Err(err) if err.is_marker(IdempotentMarker::AlreadyTracked) => {
                report.tables_already_tracked += 1;

                let CustomizationPlan {
                    configuration,
                    outcome,
                } = customization_plan(declared, baseline.get(table));

                if let MergeOutcome::Unparseable(reason) = &outcome {
                    warn!(
                        table = %table,
                        error = %reason,
                        "failed to parse existing configuration, overwriting"
                    );
                    report.unparseable_configurations += 1;
                }

                let req =
                    MetadataRequest::set_table_customization(&declared.source, table, configuration);
                self.send(&req)
                    .await
                    .map_err(|cause| ConvergeError::Customize {
                        table: table.clone(),
                        cause,
                    })?;

                info!(
                    table = %table,
                    merged = matches!(outcome, MergeOutcome::Merged),
                    "updated table customization"
                );
                report.tables_customized += 1;
                Ok(())
            }
            Err(cause) => Err(ConvergeError::Track {
                table: table.clone(),
                cause,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Phase B
    // -----------------------------------------------------------------------

    async fn create_relationships(
        &self,
        declared: &DeclaredTable,
        baseline: &MetadataSnapshot,
        report: &mut ConvergeReport,
    ) -> Result<(), ConvergeError> {
        let plan = relationship_plan(declared, baseline.get(&declared.table));

        for rel in &plan.object {
            let req =
                MetadataRequest::create_object_relationship(&declared.source, &declared.table, rel);
            self.create_relationship(declared, RelationshipKind::Object, &rel.name, &req, report)
                .await?;
        }

        for rel in &plan.array {
            let req =
                MetadataRequest::create_array_relationship(&declared.source, &declared.table, rel);
            self.create_relationship(declared, RelationshipKind::Array, &rel.name, &req, report)
                .await?;
        }

        Ok(())
    }

    async fn create_relationship(
        &self,
        declared: &DeclaredTable,
        kind: RelationshipKind,
        name: &str,
        req: &MetadataRequest,
        report: &mut ConvergeReport,
    ) -> Result<(), ConvergeError> {
        match self.send(req).await {
            Ok(_) => {
                info!(table = %declared.table, relationship = name, kind = %kind, "created relationship");
                report.relationships_created += 1;
                Ok(())
            }
            Err(err) if err.is_marker(IdempotentMarker::AlreadyExists) => {
                debug!(table = %declared.table, relationship = name, kind = %kind, "relationship already exists");
                report.relationships_already_present += 1;
                Ok(())
            }
            Err(cause) => Err(ConvergeError::CreateRelationship {
                table: declared.table.clone(),
                kind,
                name: name.to_string(),
                cause,
            }),
        }
    }
}
