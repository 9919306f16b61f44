//! Haven Flow
//!
//! This crate provides the "loaded" flow representation for Haven.
//! A loaded flow is a validated form of a flow definition that is ready for
//! execution.
//!
//! Key differences from `haven-config`:
//! - Graph structure is validated (one trigger, known successors, no orphans)
//! - Node configuration is parsed into a typed [`NodeKind`] per node
//! - Condition branch targets are guaranteed to be present
//! - The trigger node is identified up front

pub mod config;
mod error;
mod flow;
mod graph;
mod node;

pub use config::{
  Action, ActionConfig, AiCallConfig, ConditionConfig, ConditionOperator, OutputConfig,
  TransformConfig, TransformOperation,
};
pub use error::FlowError;
pub use flow::{Flow, LoadOptions};
pub use graph::Graph;
pub use node::{Node, NodeKind};
