pub mod engine;
pub mod sweep;
pub mod transitions;

pub use engine::WorkflowEngine;
pub use sweep::SweepReport;
pub use transitions::{find_rule, RoleGate, TransitionAction, TransitionRule, TRANSITION_TABLE};
