use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::wizard::states::{
    StepIndicator, StepStatus, TransitionOutcome, WizardEvent, WizardStep,
};

/// Linear step controller. Holds only the step cursor; every view is derived
/// from selection state on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wizard {
    steps: Vec<WizardStep>,
    current: usize,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self { steps: WizardStep::ALL.to_vec(), current: 0 }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> WizardStep {
        self.steps[self.current]
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.steps.len()
    }

    pub fn next(&mut self) -> TransitionOutcome {
        self.apply(WizardEvent::Next)
    }

    pub fn previous(&mut self) -> TransitionOutcome {
        self.apply(WizardEvent::Previous)
    }

    pub fn apply(&mut self, event: WizardEvent) -> TransitionOutcome {
        let from = self.current_step();
        self.current = match event {
            WizardEvent::Next if self.can_go_forward() => self.current + 1,
            WizardEvent::Previous if self.can_go_back() => self.current - 1,
            _ => self.current,
        };

        TransitionOutcome { from, to: self.current_step(), event }
    }

    pub fn apply_with_audit<S>(
        &mut self,
        event: WizardEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> TransitionOutcome
    where
        S: AuditSink,
    {
        let outcome = self.apply(event);
        let (event_type, result) = if outcome.moved() {
            ("wizard.step_changed", AuditOutcome::Success)
        } else {
            ("wizard.step_unchanged", AuditOutcome::Unchanged)
        };
        sink.emit(
            AuditEvent::new(audit, event_type, AuditCategory::Wizard, result)
                .with_metadata("from", format!("{:?}", outcome.from))
                .with_metadata("to", format!("{:?}", outcome.to))
                .with_metadata("event", format!("{:?}", outcome.event)),
        );
        outcome
    }

    /// Progress bar fill, `(current + 1) / count * 100`.
    pub fn progress_percent(&self) -> f64 {
        (self.current + 1) as f64 / self.steps.len() as f64 * 100.0
    }

    pub fn indicators(&self) -> Vec<StepIndicator> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepIndicator {
                number: index + 1,
                label: step.label().to_string(),
                status: match index.cmp(&self.current) {
                    std::cmp::Ordering::Less => StepStatus::Completed,
                    std::cmp::Ordering::Equal => StepStatus::Current,
                    std::cmp::Ordering::Greater => StepStatus::Upcoming,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::wizard::engine::Wizard;
    use crate::wizard::states::{StepStatus, WizardEvent, WizardStep};

    #[test]
    fn starts_at_agent_selection() {
        let wizard = Wizard::new();
        assert_eq!(wizard.current_index(), 0);
        assert_eq!(wizard.current_step(), WizardStep::AgentSelection);
        assert_eq!(wizard.step_count(), 2);
        assert!(!wizard.can_go_back());
        assert!(wizard.can_go_forward());
    }

    #[test]
    fn previous_at_first_step_stays_put() {
        let mut wizard = Wizard::new();
        let outcome = wizard.previous();

        assert!(!outcome.moved());
        assert_eq!(wizard.current_index(), 0);
    }

    #[test]
    fn next_at_last_step_stays_put() {
        let mut wizard = Wizard::new();
        assert!(wizard.next().moved());
        let outcome = wizard.next();

        assert!(!outcome.moved());
        assert_eq!(wizard.current_index(), wizard.step_count() - 1);
        assert_eq!(wizard.current_step(), WizardStep::Configuration);
    }

    #[test]
    fn navigation_can_go_back_and_forth_indefinitely() {
        let mut wizard = Wizard::new();
        for _ in 0..5 {
            wizard.next();
            assert_eq!(wizard.current_step(), WizardStep::Configuration);
            wizard.previous();
            assert_eq!(wizard.current_step(), WizardStep::AgentSelection);
        }
    }

    #[test]
    fn progress_and_indicators_follow_cursor() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.progress_percent(), 50.0);
        assert_eq!(wizard.indicators()[0].status, StepStatus::Current);
        assert_eq!(wizard.indicators()[1].status, StepStatus::Upcoming);

        wizard.next();
        let indicators = wizard.indicators();
        assert_eq!(wizard.progress_percent(), 100.0);
        assert_eq!(indicators[0].status, StepStatus::Completed);
        assert_eq!(indicators[1].status, StepStatus::Current);
        assert_eq!(indicators[1].label, "Configuration");
        assert_eq!(indicators[1].number, 2);
    }

    #[test]
    fn audited_transitions_record_clamped_moves() {
        let mut wizard = Wizard::new();
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new("onboarding-1", "req-9", "wizard");

        wizard.apply_with_audit(WizardEvent::Previous, &sink, &audit);
        wizard.apply_with_audit(WizardEvent::Next, &sink, &audit);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "wizard.step_unchanged");
        assert_eq!(events[1].event_type, "wizard.step_changed");
        assert_eq!(events[1].metadata.get("to").map(String::as_str), Some("Configuration"));
    }
}
