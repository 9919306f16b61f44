use crate::nodes::NodeOutcome;
use crate::variables::Variables;

/// The trigger passes the initial variables through unchanged.
pub(super) fn execute(vars: &Variables) -> NodeOutcome {
  NodeOutcome::continue_with(None, vars.snapshot())
}
