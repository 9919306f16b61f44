//! Haven Engine
//!
//! Connects trigger sources to the runtime. A [`FlowRunner`] owns the
//! channel that manual invocations, schedules, events and webhooks push
//! payloads into, and starts one run per payload.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FlowRunner                           │
//! │  - owns mpsc channel (sender + receiver)                    │
//! │  - run(payload) triggers a run                              │
//! │  - start(cancel) runs the loop, one task per payload        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Runtime                            │
//! │  - execute(flow, variables, cancel) → ExecutionContext      │
//! │  - depth-first walk, node semantics, {{path}} templates     │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Capabilities                          │
//! │  - completion provider, persistence, notifications, alerts  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod runner;

pub use error::EngineError;
pub use runner::FlowRunner;
