//! Rule Document
//!
//! Structural validation ([`schema`]) and compilation into a typed
//! [`RuleSet`] of the `dagrules.yml` document. The engine receives the
//! document as an in-memory `serde_json::Value`; reading it from disk is
//! the caller's concern.

pub mod schema;

mod rule_set;

pub use rule_set::{Rule, RuleSet};
