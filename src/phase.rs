//! Lifecycle phases a unit reacts in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three lifecycle categories an event can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Bring the workload up: install, start, upgrade.
    Setup,
    /// Converge on the desired state; runs on (almost) every hook.
    Maintenance,
    /// Tear the workload down: stop, remove.
    Teardown,
}

impl Phase {
    /// All phases in router wiring order.
    pub const ALL: [Self; 3] = [Self::Setup, Self::Teardown, Self::Maintenance];

    /// Name of the unit method this phase forwards to.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Maintenance => "reconcile",
            Self::Teardown => "teardown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Setup => "setup",
            Self::Maintenance => "maintenance",
            Self::Teardown => "teardown",
        };
        f.write_str(s)
    }
}
