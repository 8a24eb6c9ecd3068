use super::error::{StateError, StateResult};
use super::{event::PhaseTransition, SessionEvent, SessionPhase};

#[derive(Debug)]
pub struct PhaseMachine {
    phase: SessionPhase,
    transition_history: Vec<PhaseTransition>,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn can_transition(&self, event: SessionEvent) -> bool {
        self.next_phase(event).is_some()
    }

    pub fn next_phase(&self, event: SessionEvent) -> Option<SessionPhase> {
        use SessionEvent::*;
        match (self.phase, event) {
            (SessionPhase::Loading, ImageDecoded) => Some(SessionPhase::Editing),
            (SessionPhase::Editing, ImageDecoded) => Some(SessionPhase::Editing),
            (SessionPhase::ComposingText, ImageDecoded) => Some(SessionPhase::Editing),
            (SessionPhase::Editing, TextBoxRequested) => Some(SessionPhase::ComposingText),
            (SessionPhase::ComposingText, TextBoxCommitted) => Some(SessionPhase::Editing),
            (SessionPhase::ComposingText, TextBoxCancelled) => Some(SessionPhase::Editing),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: SessionEvent) -> StateResult<SessionPhase> {
        tracing::debug!(from = ?self.phase, event = ?event, "request session transition");
        let next = self.next_phase(event).ok_or_else(|| {
            let from = self.phase;
            tracing::warn!(from = ?from, event = ?event, "invalid session transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = PhaseTransition::new(Some(self.phase), event, next);
        self.phase = next;
        self.transition_history.push(record);

        Ok(self.phase)
    }

    pub fn history(&self) -> &[PhaseTransition] {
        &self.transition_history
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PhaseMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionPhase::{:?}", self.phase)
    }
}
