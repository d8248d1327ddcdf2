//! Outcome contracts: what the downstream checker should observe for a policy
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeHandler {
    /// Expected exit code of the checker
    pub exit_code: i32,
    /// Whether the checker is expected to crash
    pub should_crash: bool,
    /// Whether the policy is expected to be violated
    pub should_be_violated: bool,
}

/// Clean run: exit 0, no crash, no violation
pub const NORMAL: OutcomeHandler = OutcomeHandler::new(0, false, false);

impl OutcomeHandler {
    pub const fn new(exit_code: i32, should_crash: bool, should_be_violated: bool) -> Self {
        Self {
            exit_code,
            should_crash,
            should_be_violated,
        }
    }

    pub fn is_normal(&self) -> bool {
        *self == NORMAL
    }
}

impl Default for OutcomeHandler {
    fn default() -> Self {
        NORMAL
    }
}
