//! Haven Runtime
//!
//! Executes loaded flows. A run starts at the flow's trigger with an initial
//! variable set and walks successors depth-first, one node at a time:
//!
//! - operator-authored text is resolved against the run's [`Variables`]
//!   through `{{path}}` templates
//! - each node kind applies its semantics and writes results back into the
//!   variables
//! - a `condition` continues to exactly one branch; every other kind
//!   continues to all of its declared successors, in order
//! - the first node failure aborts the whole run
//!
//! Every run produces an [`ExecutionContext`] holding its variables, a
//! started/terminal log entry pair per visited node, and a terminal status.
//!
//! # Usage
//!
//! ```ignore
//! let runtime = Runtime::new(capabilities, RuntimeConfig::default());
//! let flow = Flow::load(def)?;
//! let ctx = runtime
//!   .execute(&flow, Variables::from_value(payload), CancellationToken::new())
//!   .await;
//! assert_eq!(ctx.status, ExecutionStatus::Completed);
//! ```

mod config;
mod context;
mod error;
mod events;
pub mod nodes;
mod runtime;
pub mod template;
mod variables;

pub use config::RuntimeConfig;
pub use context::{ENGINE_NODE_ID, ExecutionContext, ExecutionStatus, LogEntry, LogStatus};
pub use error::{NodeError, RuntimeError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use runtime::Runtime;
pub use variables::{Variables, display};
