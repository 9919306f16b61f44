//! Haven Config
//!
//! This crate contains the serializable flow definition types for Haven.
//! These types represent flows as an operator authored them, before they are
//! validated and loaded by `haven-flow`.
//!
//! Definitions can come from:
//! - JSON files (via CLI with `haven run flow flow.json`)
//! - The flow catalog of the host application (as JSON blobs)
//!
//! Node configuration is kept as a free-form map here. Its shape depends on
//! the node type and is only checked when the flow is loaded.

mod flow;
mod node;
mod trigger;

pub use flow::FlowDef;
pub use node::{ConfigMap, NodeDef, NodeType, Position};
pub use trigger::{TriggerDef, TriggerKind};
