use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hmeta_config::{load_declared_tables, GatewayConfig};
use hmeta_reconcile::MetadataSnapshot;
use hmeta_runtime::Reconciler;
use hmeta_schemas::{Named, Table};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hmeta")]
#[command(about = "GraphQL gateway metadata reconciler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track, customize and relate every table in a catalog file.
    Apply {
        /// Catalog of declared tables (YAML, or JSON by `.json` extension)
        #[arg(long)]
        tables: PathBuf,

        /// Gateway source name (overrides HMETA_SOURCE)
        #[arg(long)]
        source: Option<String>,
    },

    /// Print the tables currently tracked in a source.
    Snapshot {
        /// Gateway source name (overrides HMETA_SOURCE)
        #[arg(long)]
        source: Option<String>,
    },
}

/// One line of `hmeta snapshot` output.
#[derive(Serialize)]
struct TrackedTableSummary<'a> {
    table: &'a Table,
    customized: bool,
    object_relationships: Vec<&'a str>,
    array_relationships: Vec<&'a str>,
}

fn summarize(snapshot: &MetadataSnapshot) -> Vec<TrackedTableSummary<'_>> {
    snapshot
        .tables
        .iter()
        .map(|(table, existing)| TrackedTableSummary {
            table,
            customized: existing.configuration.is_some(),
            object_relationships: existing.object_relationships.iter().map(Named::name).collect(),
            array_relationships: existing.array_relationships.iter().map(Named::name).collect(),
        })
        .collect()
}

fn gateway_config(source: Option<String>) -> Result<GatewayConfig> {
    let cfg = GatewayConfig::from_env().context("load gateway config")?;
    Ok(match source {
        Some(s) => cfg.with_source(s),
        None => cfg,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Apply { tables, source } => {
            let cfg = gateway_config(source)?;
            let declared = load_declared_tables(&tables, cfg.source())?;
            info!(
                source = cfg.source(),
                tables = declared.len(),
                file = %tables.display(),
                "applying metadata"
            );

            let reconciler = Reconciler::from_config(&cfg).context("build gateway client")?;
            let report = reconciler
                .converge_until(&declared, shutdown_signal())
                .await
                .context("apply metadata")?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Snapshot { source } => {
            let cfg = gateway_config(source)?;
            let reconciler = Reconciler::from_config(&cfg).context("build gateway client")?;
            let snapshot = reconciler
                .fetch_snapshot()
                .await
                .context("fetch metadata snapshot")?;

            println!("{}", serde_json::to_string_pretty(&summarize(&snapshot))?);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmeta_reconcile::decode_export;
    use serde_json::json;

    #[test]
    fn summary_lists_relationship_names() {
        let body = serde_json::to_vec(&json!({
            "metadata": {"sources": [{
                "name": "default",
                "tables": [
                    {"table": {"schema": "storage", "name": "buckets"}},
                    {
                        "table": {"schema": "storage", "name": "files"},
                        "configuration": {"custom_name": "files"},
                        "object_relationships": [
                            {"name": "bucket", "using": {"foreign_key_constraint_on": "bucket_id"}}
                        ]
                    }
                ]
            }]}
        }))
        .unwrap();
        let snapshot = decode_export(&body, "default").unwrap();

        let out = serde_json::to_value(summarize(&snapshot)).unwrap();
        assert_eq!(
            out,
            json!([
                {
                    "table": {"schema": "storage", "name": "buckets"},
                    "customized": false,
                    "object_relationships": [],
                    "array_relationships": []
                },
                {
                    "table": {"schema": "storage", "name": "files"},
                    "customized": true,
                    "object_relationships": ["bucket"],
                    "array_relationships": []
                }
            ])
        );
    }

    #[test]
    fn apply_requires_tables_flag() {
        assert!(Cli::try_parse_from(["hmeta", "apply"]).is_err());
        assert!(Cli::try_parse_from(["hmeta", "apply", "--tables", "t.yaml"]).is_ok());
    }
}
