//! State machine trait for lifecycle enums.
//!
//! Shared by connection lifecycles and machine status so every transition
//! goes through one validated path.

use super::ValidationError;

/// Trait for enums that model a finite set of lifecycle states.
///
/// Implementors list their legal edges; `transition_to` and `is_terminal`
/// come for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if moving from self to target is a legal edge.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns all legal target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs the transition, or reports it as invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, target))
        }
    }

    /// A state with no outgoing edges.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        On,
        Broken,
    }

    impl StateMachine for Light {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Off => vec![Light::On, Light::Broken],
                Light::On => vec![Light::Off, Light::Broken],
                Light::Broken => vec![],
            }
        }
    }

    #[test]
    fn legal_edge_is_accepted() {
        assert_eq!(Light::Off.transition_to(Light::On), Ok(Light::On));
    }

    #[test]
    fn illegal_edge_reports_both_states() {
        let err = Light::Broken.transition_to(Light::On).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTransition {
                from: "Broken".to_string(),
                to: "On".to_string()
            }
        );
    }

    #[test]
    fn default_can_transition_to_follows_valid_transitions() {
        assert!(Light::On.can_transition_to(&Light::Off));
        assert!(!Light::On.can_transition_to(&Light::On));
    }

    #[test]
    fn terminal_only_when_no_edges() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::Off.is_terminal());
    }
}
