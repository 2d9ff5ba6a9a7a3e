//! hmeta-testkit
//!
//! In-memory stand-ins for the gateway, for scenario tests:
//! - [`ScriptedGateway`]: a [`Transport`] that simulates tracked tables,
//!   customizations and relationships, records every request, and lets tests
//!   override replies per request type / table / relationship.
//! - [`fixtures`]: small declared-table catalogs.
//!
//! Replies go through [`classify_response`] exactly like real HTTP replies,
//! so markers and hard failures are classified by production code.

pub mod fixtures;
mod gateway;

pub use gateway::{Reply, Rule, ScriptedGateway};

pub use hmeta_transport::{classify_response, Transport};
