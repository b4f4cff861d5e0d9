// Playbook Extractor - server
//
// Composition root for the playbooks library: environment configuration,
// Postgres + model client wiring, the HTTP API and the operator CLI.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
