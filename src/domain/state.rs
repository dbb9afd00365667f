use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation run state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationPhase {
    /// Market state generated, no step taken yet
    Initialized,
    /// At least one step taken, budget not yet exhausted
    Stepping,
    /// Step budget exhausted
    Completed,
}

impl SimulationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationPhase::Initialized => "INITIALIZED",
            SimulationPhase::Stepping => "STEPPING",
            SimulationPhase::Completed => "COMPLETED",
        }
    }

    /// Check if this state can transition to another state
    pub fn can_transition_to(&self, target: SimulationPhase) -> bool {
        use SimulationPhase::*;

        match (self, target) {
            (Initialized, Stepping) => true,
            // Zero-step runs complete immediately
            (Initialized, Completed) => true,
            (Stepping, Stepping) => true,
            (Stepping, Completed) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationPhase::Completed)
    }
}

impl fmt::Display for SimulationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        use SimulationPhase::*;

        assert!(Initialized.can_transition_to(Stepping));
        assert!(Initialized.can_transition_to(Completed));
        assert!(Stepping.can_transition_to(Stepping));
        assert!(Stepping.can_transition_to(Completed));
    }

    #[test]
    fn test_completed_is_terminal() {
        use SimulationPhase::*;

        assert!(Completed.is_terminal());
        assert!(!Completed.can_transition_to(Stepping));
        assert!(!Completed.can_transition_to(Initialized));
        assert!(!Stepping.can_transition_to(Initialized));
    }
}
