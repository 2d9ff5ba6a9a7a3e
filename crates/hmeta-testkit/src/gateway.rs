use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hmeta_schemas::Table;
use hmeta_transport::{classify_response, Transport, TransportError};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Scripted replies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Answer with this status and JSON body.
    Status { status: u16, body: Value },
    /// Answer with this status and a raw (possibly non-JSON) body.
    Raw { status: u16, body: String },
    /// Never answer. Used to exercise cancellation.
    Hang,
}

/// Override for requests matching a type and, optionally, a table and a
/// relationship name. Rules are checked in insertion order; the first match
/// wins and the simulated state is left untouched.
#[derive(Clone, Debug)]
pub struct Rule {
    request_type: String,
    table: Option<Table>,
    relationship: Option<String>,
    reply: Reply,
}

impl Rule {
    pub fn on(request_type: &str) -> Self {
        Self {
            request_type: request_type.to_string(),
            table: None,
            relationship: None,
            reply: Reply::Hang,
        }
    }

    pub fn for_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn for_relationship(mut self, name: &str) -> Self {
        self.relationship = Some(name.to_string());
        self
    }

    pub fn respond(mut self, status: u16, body: Value) -> Self {
        self.reply = Reply::Status { status, body };
        self
    }

    pub fn respond_raw(mut self, status: u16, body: &str) -> Self {
        self.reply = Reply::Raw {
            status,
            body: body.to_string(),
        };
        self
    }

    pub fn hang(mut self) -> Self {
        self.reply = Reply::Hang;
        self
    }

    fn matches(&self, kind: &str, table: Option<&Table>, relationship: Option<&str>) -> bool {
        self.request_type == kind
            && self.table.as_ref().map_or(true, |t| Some(t) == table)
            && self
                .relationship
                .as_deref()
                .map_or(true, |r| Some(r) == relationship)
    }
}

// ---------------------------------------------------------------------------
// Simulated state
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
struct TrackedTable {
    configuration: Option<Value>,
    object_relationships: Vec<Value>,
    array_relationships: Vec<Value>,
}

#[derive(Debug, Default)]
struct State {
    /// source -> table -> tracked state
    sources: BTreeMap<String, BTreeMap<Table, TrackedTable>>,
    requests: Vec<Value>,
    rules: Vec<Rule>,
}

fn success() -> Reply {
    Reply::Status {
        status: 200,
        body: json!({"message": "success"}),
    }
}

fn gateway_error(code: &str, error: String) -> Reply {
    Reply::Status {
        status: 400,
        body: json!({"path": "$.args", "error": error, "code": code}),
    }
}

impl State {
    fn export(&self) -> Value {
        let sources: Vec<Value> = self
            .sources
            .iter()
            .map(|(name, tables)| {
                let tables: Vec<Value> = tables
                    .iter()
                    .map(|(table, t)| {
                        let mut entry = json!({"table": table});
                        if let Some(cfg) = &t.configuration {
                            entry["configuration"] = cfg.clone();
                        }
                        if !t.object_relationships.is_empty() {
                            entry["object_relationships"] = json!(t.object_relationships);
                        }
                        if !t.array_relationships.is_empty() {
                            entry["array_relationships"] = json!(t.array_relationships);
                        }
                        entry
                    })
                    .collect();
                json!({"name": name, "kind": "postgres", "tables": tables})
            })
            .collect();

        json!({"resource_version": 1, "metadata": {"version": 3, "sources": sources}})
    }

    fn handle(&mut self, payload: &Value) -> Reply {
        let kind = payload["type"].as_str().unwrap_or_default();
        let args = &payload["args"];
        let source = args["source"].as_str().unwrap_or_default().to_string();
        let table: Option<Table> = serde_json::from_value(args["table"].clone()).ok();
        let name = args["name"].as_str();

        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| r.matches(kind, table.as_ref(), name))
        {
            return rule.reply.clone();
        }

        if kind == "export_metadata" {
            return Reply::Status {
                status: 200,
                body: self.export(),
            };
        }

        let Some(table) = table else {
            return gateway_error("parse-failed", format!("missing table in {kind}"));
        };
        let tables = self.sources.entry(source.clone()).or_default();

        match kind {
            "pg_track_table" => {
                if tables.contains_key(&table) {
                    return gateway_error(
                        "already-tracked",
                        format!("view/table already tracked: \"{table}\""),
                    );
                }
                tables.insert(
                    table,
                    TrackedTable {
                        configuration: Some(args["configuration"].clone()),
                        ..TrackedTable::default()
                    },
                );
                success()
            }
            "pg_set_table_customization" => match tables.get_mut(&table) {
                Some(t) => {
                    t.configuration = Some(args["configuration"].clone());
                    success()
                }
                None => gateway_error(
                    "not-exists",
                    format!("table \"{table}\" does not exist in source: {source}"),
                ),
            },
            "pg_create_object_relationship" | "pg_create_array_relationship" => {
                let Some(t) = tables.get_mut(&table) else {
                    return gateway_error(
                        "not-exists",
                        format!("table \"{table}\" does not exist in source: {source}"),
                    );
                };
                let rels = if kind == "pg_create_object_relationship" {
                    &mut t.object_relationships
                } else {
                    &mut t.array_relationships
                };
                let name = name.unwrap_or_default();
                if rels.iter().any(|r| r["name"] == name) {
                    return gateway_error(
                        "already-exists",
                        format!("field with name \"{name}\" already exists"),
                    );
                }
                rels.push(json!({"name": name, "using": args["using"].clone()}));
                success()
            }
            other => gateway_error("invalid-type", format!("unknown request type {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedGateway
// ---------------------------------------------------------------------------

/// Cloning shares state, so a test can hand one clone to the reconciler and
/// inspect the other.
#[derive(Clone, Debug, Default)]
pub struct ScriptedGateway {
    state: Arc<Mutex<State>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a tracked table. Relationships are raw export entries
    /// (`{"name": .., "using": ..}`).
    pub fn with_tracked_table(
        self,
        source: &str,
        table: Table,
        configuration: Option<Value>,
        object_relationships: Vec<Value>,
        array_relationships: Vec<Value>,
    ) -> Self {
        self.lock().sources.entry(source.to_string()).or_default().insert(
            table,
            TrackedTable {
                configuration,
                object_relationships,
                array_relationships,
            },
        );
        self
    }

    pub fn with_rule(self, rule: Rule) -> Self {
        self.add_rule(rule);
        self
    }

    pub fn add_rule(&self, rule: Rule) {
        self.lock().rules.push(rule);
    }

    pub fn clear_rules(&self) {
        self.lock().rules.clear();
    }

    /// Every payload received, in order.
    pub fn requests(&self) -> Vec<Value> {
        self.lock().requests.clone()
    }

    /// `type` of every payload received, in order.
    pub fn request_types(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|r| r["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    pub fn is_tracked(&self, source: &str, table: &Table) -> bool {
        self.lock()
            .sources
            .get(source)
            .is_some_and(|t| t.contains_key(table))
    }

    pub fn configuration_of(&self, source: &str, table: &Table) -> Option<Value> {
        self.lock()
            .sources
            .get(source)?
            .get(table)?
            .configuration
            .clone()
    }

    /// Object and array relationship names of a tracked table.
    pub fn relationship_names(&self, source: &str, table: &Table) -> (Vec<String>, Vec<String>) {
        let state = self.lock();
        let Some(t) = state.sources.get(source).and_then(|s| s.get(table)) else {
            return (Vec::new(), Vec::new());
        };
        let names = |rels: &[Value]| {
            rels.iter()
                .filter_map(|r| r["name"].as_str().map(str::to_string))
                .collect()
        };
        (names(&t.object_relationships), names(&t.array_relationships))
    }

    /// The export document the gateway would return right now.
    pub fn export(&self) -> Value {
        self.lock().export()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedGateway {
    async fn post(&self, payload: &Value) -> Result<Vec<u8>, TransportError> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(payload.clone());
            state.handle(payload)
        };

        match reply {
            Reply::Status { status, body } => {
                let bytes =
                    serde_json::to_vec(&body).map_err(|e| TransportError::Encode(e.to_string()))?;
                classify_response(status, &bytes)
            }
            Reply::Raw { status, body } => classify_response(status, body.as_bytes()),
            Reply::Hang => std::future::pending().await,
        }
    }
}
