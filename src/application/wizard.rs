//! Multi-step form controller.
//!
//! Owns the current step and the panel models, derives what each step
//! should look like, and gates navigation and submission on validation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{
    default_date_value, DefinitionResult, FieldKind, FormDefinition, NavigationError,
    SignatureCheck, StepPanel, SubmitError, Submission, UploadedFileEntry, ValidationError,
    WizardError,
};

/// Shown once a request passes every check.
pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your service request has been submitted successfully. We will contact you shortly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Neutral,
    Active,
    Completed,
}

/// Visual state of the wizard for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub step: usize,
    /// One flag per panel; only the shown panel is active.
    pub panels: Vec<bool>,
    pub indicators: Vec<IndicatorState>,
    pub show_previous: bool,
    pub show_next: bool,
    pub show_submit: bool,
    /// The host should bring the form container into view.
    pub scroll_into_view: bool,
}

impl StepView {
    fn compute(step: usize, total: usize) -> Self {
        let indicators = (1..=total)
            .map(|index| {
                if index < step {
                    IndicatorState::Completed
                } else if index == step {
                    IndicatorState::Active
                } else {
                    IndicatorState::Neutral
                }
            })
            .collect();

        Self {
            step,
            panels: (1..=total).map(|index| index == step).collect(),
            indicators,
            show_previous: step != 1,
            show_next: step != total,
            show_submit: step == total,
            scroll_into_view: true,
        }
    }
}

/// Step wizard over an owned form model.
///
/// # Examples
///
/// ```
/// use servform::application::StepWizard;
/// use servform::domain::FormDefinition;
///
/// let wizard = StepWizard::new(FormDefinition::default()).unwrap();
/// assert_eq!(wizard.current_step(), 1);
/// assert_eq!(wizard.total_steps(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct StepWizard {
    definition: FormDefinition,
    current_step: usize,
    terms_agreed: Option<bool>,
    view: StepView,
}

impl StepWizard {
    pub fn new(definition: FormDefinition) -> DefinitionResult<Self> {
        let definition = definition.normalized()?;
        let total = definition.total_steps();
        let terms_agreed = definition.terms.then_some(false);
        debug!(total_steps = total, "wizard initialized");

        Ok(Self {
            definition,
            current_step: 1,
            terms_agreed,
            view: StepView::compute(1, total),
        })
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.definition.total_steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == self.total_steps()
    }

    pub fn view(&self) -> &StepView {
        &self.view
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn panel(&self, step: usize) -> Option<&StepPanel> {
        step.checked_sub(1).and_then(|i| self.definition.steps.get(i))
    }

    fn panel_mut(&mut self, step: usize) -> Option<&mut StepPanel> {
        step.checked_sub(1).and_then(|i| self.definition.steps.get_mut(i))
    }

    pub fn current_panel(&self) -> Option<&StepPanel> {
        self.panel(self.current_step)
    }

    /// `None` when the form has no terms checkbox.
    pub fn terms_agreed(&self) -> Option<bool> {
        self.terms_agreed
    }

    pub fn set_terms_agreed(&mut self, agreed: bool) {
        if let Some(terms) = self.terms_agreed.as_mut() {
            *terms = agreed;
        }
    }

    /// Shows step `n`, making it current.
    pub fn show_step(&mut self, n: usize) -> Result<StepView, NavigationError> {
        let total = self.total_steps();
        if n == 0 || n > total {
            return Err(NavigationError::StepOutOfRange { requested: n, total });
        }
        self.current_step = n;
        self.view = StepView::compute(n, total);
        debug!(step = n, "step shown");
        Ok(self.view.clone())
    }

    /// Checks panel `n`, flagging every blank required field.
    ///
    /// Panel 1 also needs at least one checked service. A panel that does not
    /// exist has nothing to check.
    pub fn validate_step(&mut self, n: usize) -> Result<(), ValidationError> {
        let Some(panel) = self.panel_mut(n) else {
            return Ok(());
        };

        let mut missing = Vec::new();
        for field in panel.fields.iter_mut().filter(|f| f.required) {
            if field.value.trim().is_empty() {
                field.error = true;
                missing.push(field.name.clone());
            }
        }

        if n == 1 && panel.checked_services() == 0 {
            debug!(step = n, "no service selected");
            return Err(ValidationError::NoServiceSelected);
        }
        if !missing.is_empty() {
            debug!(step = n, fields = ?missing, "required fields missing");
            return Err(ValidationError::MissingRequiredFields { step: n, fields: missing });
        }
        Ok(())
    }

    pub fn is_step_valid(&mut self, n: usize) -> bool {
        self.validate_step(n).is_ok()
    }

    pub fn next(&mut self) -> Result<StepView, WizardError> {
        if self.is_last_step() {
            return Err(NavigationError::AtLastStep.into());
        }
        self.validate_step(self.current_step)?;
        Ok(self.show_step(self.current_step + 1)?)
    }

    pub fn previous(&mut self) -> Result<StepView, WizardError> {
        if self.current_step == 1 {
            return Err(NavigationError::AtFirstStep.into());
        }
        Ok(self.show_step(self.current_step - 1)?)
    }

    /// Runs the submission checks in order and stops at the first failure:
    /// current step valid, terms agreed, signature present.
    ///
    /// Never changes the current step. `files` is the host's upload
    /// selection and is carried into the accepted submission.
    pub fn submit(
        &mut self,
        signature: Option<&dyn SignatureCheck>,
        files: &[UploadedFileEntry],
    ) -> Result<Submission, SubmitError> {
        self.validate_step(self.current_step)?;

        if self.terms_agreed == Some(false) {
            return Err(SubmitError::TermsNotAgreed);
        }

        if let Some(pad) = signature {
            if !pad.has_signature() {
                return Err(SubmitError::SignatureMissing);
            }
        }

        let submission = self.snapshot(files);
        info!(services = ?submission.services, files = submission.files.len(), "service request accepted");
        Ok(submission)
    }

    fn snapshot(&self, files: &[UploadedFileEntry]) -> Submission {
        let services = self
            .definition
            .steps
            .iter()
            .flat_map(|p| p.services.iter())
            .filter(|s| s.checked)
            .map(|s| s.value.clone())
            .collect();

        let fields: BTreeMap<String, String> = self
            .definition
            .steps
            .iter()
            .flat_map(|p| p.fields.iter())
            .filter(|f| !f.value.trim().is_empty())
            .map(|f| (f.name.clone(), f.value.trim().to_string()))
            .collect();

        Submission {
            services,
            fields,
            files: files.to_vec(),
        }
    }

    /// Records new input on a field and clears its error flag.
    ///
    /// Returns false if panel `step` has no such field.
    pub fn field_input(&mut self, step: usize, name: &str, value: &str) -> bool {
        match self.panel_mut(step).and_then(|p| p.field_mut(name)) {
            Some(field) => {
                field.value = value.to_string();
                field.error = false;
                true
            }
            None => false,
        }
    }

    pub fn set_service(&mut self, value: &str, checked: bool) -> bool {
        let option = self
            .definition
            .steps
            .iter_mut()
            .flat_map(|p| p.services.iter_mut())
            .find(|s| s.value == value);
        match option {
            Some(option) => {
                option.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Flips a service and returns its new state.
    pub fn toggle_service(&mut self, value: &str) -> Option<bool> {
        let option = self
            .definition
            .steps
            .iter_mut()
            .flat_map(|p| p.services.iter_mut())
            .find(|s| s.value == value)?;
        option.checked = !option.checked;
        Some(option.checked)
    }

    /// Pre-fills empty defaulted date fields with `today`.
    pub fn apply_date_defaults(&mut self, today: NaiveDate) {
        for field in self
            .definition
            .steps
            .iter_mut()
            .flat_map(|p| p.fields.iter_mut())
            .filter(|f| f.kind == FieldKind::Date)
        {
            if let Some(value) = default_date_value(&field.name, &field.value, today) {
                field.value = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FormField, ServiceOption};

    struct FixedSignature(bool);

    impl SignatureCheck for FixedSignature {
        fn has_signature(&self) -> bool {
            self.0
        }
    }

    fn three_step_definition() -> FormDefinition {
        FormDefinition {
            title: "Test".to_string(),
            steps: vec![
                StepPanel {
                    step: 1,
                    title: "One".to_string(),
                    fields: vec![FormField::new("name", "Name", FieldKind::Text, true)],
                    services: vec![ServiceOption::new("a", "A"), ServiceOption::new("b", "B")],
                },
                StepPanel {
                    step: 2,
                    title: "Two".to_string(),
                    fields: vec![
                        FormField::new("address", "Address", FieldKind::Text, true),
                        FormField::new("notes", "Notes", FieldKind::TextArea, false),
                    ],
                    services: Vec::new(),
                },
                StepPanel {
                    step: 3,
                    title: "Three".to_string(),
                    fields: vec![FormField::new("signatureDate", "Date", FieldKind::Date, true)],
                    services: Vec::new(),
                },
            ],
            terms: true,
            signature: true,
            uploads: false,
        }
    }

    fn filled_wizard() -> StepWizard {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        wizard.field_input(1, "name", "Ada Lovelace");
        wizard.set_service("a", true);
        wizard.field_input(2, "address", "1 Main St");
        wizard.field_input(3, "signatureDate", "2024-03-07");
        wizard
    }

    #[test]
    fn test_new_starts_on_first_step() {
        let wizard = StepWizard::new(three_step_definition()).unwrap();
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.total_steps(), 3);
        assert_eq!(wizard.terms_agreed(), Some(false));
        assert_eq!(wizard.view().step, 1);
        assert!(!wizard.view().show_previous);
    }

    #[test]
    fn test_show_step_invariants() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        for n in 1..=3 {
            let view = wizard.show_step(n).unwrap();
            assert_eq!(view.panels.iter().filter(|active| **active).count(), 1);
            assert!(view.panels[n - 1]);
            let active = view
                .indicators
                .iter()
                .filter(|s| **s == IndicatorState::Active)
                .count();
            assert_eq!(active, 1);
            for (index, state) in view.indicators.iter().enumerate() {
                let ordinal = index + 1;
                if ordinal < n {
                    assert_eq!(*state, IndicatorState::Completed);
                } else if ordinal > n {
                    assert_eq!(*state, IndicatorState::Neutral);
                }
            }
            assert_eq!(view.show_previous, n != 1);
            assert_eq!(view.show_next, n != 3);
            assert_eq!(view.show_submit, n == 3);
            assert!(view.scroll_into_view);
        }
    }

    #[test]
    fn test_show_step_out_of_range() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        assert_eq!(
            wizard.show_step(0),
            Err(NavigationError::StepOutOfRange { requested: 0, total: 3 })
        );
        assert_eq!(
            wizard.show_step(4),
            Err(NavigationError::StepOutOfRange { requested: 4, total: 3 })
        );
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn test_validate_step_one_requires_service() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        wizard.field_input(1, "name", "Ada");
        assert_eq!(wizard.validate_step(1), Err(ValidationError::NoServiceSelected));
        wizard.set_service("b", true);
        assert_eq!(wizard.validate_step(1), Ok(()));
    }

    #[test]
    fn test_validate_flags_blank_fields() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        wizard.field_input(2, "address", "   ");
        assert_eq!(
            wizard.validate_step(2),
            Err(ValidationError::MissingRequiredFields {
                step: 2,
                fields: vec!["address".to_string()],
            })
        );
        let panel = wizard.panel(2).unwrap();
        assert!(panel.field("address").unwrap().error);
        assert!(!panel.field("notes").unwrap().error);
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn test_service_error_still_flags_fields() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        assert_eq!(wizard.validate_step(1), Err(ValidationError::NoServiceSelected));
        assert!(wizard.panel(1).unwrap().field("name").unwrap().error);
    }

    #[test]
    fn test_field_input_clears_error() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        let _ = wizard.validate_step(2);
        assert!(wizard.panel(2).unwrap().field("address").unwrap().error);
        assert!(wizard.field_input(2, "address", "x"));
        assert!(!wizard.panel(2).unwrap().field("address").unwrap().error);
        assert!(!wizard.field_input(2, "missing", "x"));
    }

    #[test]
    fn test_validate_unknown_step_passes() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        assert!(wizard.is_step_valid(9));
        assert!(wizard.is_step_valid(0));
    }

    #[test]
    fn test_next_blocked_by_validation() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        let result = wizard.next();
        assert!(matches!(result, Err(WizardError::Validation(_))));
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn test_next_and_previous_move_by_one() {
        let mut wizard = filled_wizard();
        assert_eq!(wizard.next().unwrap().step, 2);
        assert_eq!(wizard.current_step(), 2);
        assert_eq!(wizard.next().unwrap().step, 3);
        assert_eq!(wizard.previous().unwrap().step, 2);
        assert_eq!(wizard.previous().unwrap().step, 1);
    }

    #[test]
    fn test_navigation_bounds_are_reported() {
        let mut wizard = filled_wizard();
        assert_eq!(wizard.previous(), Err(WizardError::Navigation(NavigationError::AtFirstStep)));
        wizard.show_step(3).unwrap();
        assert_eq!(wizard.next(), Err(WizardError::Navigation(NavigationError::AtLastStep)));
        assert_eq!(wizard.current_step(), 3);
    }

    #[test]
    fn test_submit_succeeds_when_complete() {
        let mut wizard = filled_wizard();
        wizard.next().unwrap();
        wizard.next().unwrap();
        wizard.set_terms_agreed(true);

        let submission = wizard.submit(Some(&FixedSignature(true)), &[]).unwrap();
        assert_eq!(submission.services, vec!["a".to_string()]);
        assert_eq!(submission.fields.get("name").map(String::as_str), Some("Ada Lovelace"));
        assert!(!submission.fields.contains_key("notes"));
        assert_eq!(wizard.current_step(), 3);
        assert_eq!(wizard.view().indicators[2], IndicatorState::Active);
    }

    #[test]
    fn test_submit_carries_selected_files() {
        let mut wizard = filled_wizard();
        wizard.show_step(3).unwrap();
        wizard.set_terms_agreed(true);

        let files = [UploadedFileEntry::new("deed.pdf", 2048)];
        let submission = wizard.submit(Some(&FixedSignature(true)), &files).unwrap();
        assert_eq!(submission.files, files.to_vec());
    }

    #[test]
    fn test_submit_requires_terms() {
        let mut wizard = filled_wizard();
        wizard.show_step(3).unwrap();
        assert_eq!(
            wizard.submit(Some(&FixedSignature(true)), &[]),
            Err(SubmitError::TermsNotAgreed)
        );
        assert_eq!(wizard.current_step(), 3);
    }

    #[test]
    fn test_submit_requires_signature() {
        let mut wizard = filled_wizard();
        wizard.show_step(3).unwrap();
        wizard.set_terms_agreed(true);
        assert_eq!(
            wizard.submit(Some(&FixedSignature(false)), &[]),
            Err(SubmitError::SignatureMissing)
        );
        assert!(wizard.submit(None, &[]).is_ok());
    }

    #[test]
    fn test_submit_validates_current_step_first() {
        let mut wizard = filled_wizard();
        wizard.show_step(3).unwrap();
        wizard.field_input(3, "signatureDate", "");
        assert!(matches!(
            wizard.submit(Some(&FixedSignature(false)), &[]),
            Err(SubmitError::Validation(ValidationError::MissingRequiredFields { step: 3, .. }))
        ));
    }

    #[test]
    fn test_terms_absent_skips_check() {
        let mut definition = three_step_definition();
        definition.terms = false;
        let mut wizard = StepWizard::new(definition).unwrap();
        wizard.set_terms_agreed(true);
        assert_eq!(wizard.terms_agreed(), None);
    }

    #[test]
    fn test_toggle_service() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        assert_eq!(wizard.toggle_service("a"), Some(true));
        assert_eq!(wizard.toggle_service("a"), Some(false));
        assert_eq!(wizard.toggle_service("zzz"), None);
    }

    #[test]
    fn test_apply_date_defaults() {
        let mut wizard = StepWizard::new(three_step_definition()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        wizard.apply_date_defaults(today);
        assert_eq!(
            wizard.panel(3).unwrap().field("signatureDate").unwrap().value,
            "2024-05-01"
        );

        wizard.field_input(3, "signatureDate", "2023-12-31");
        wizard.apply_date_defaults(today);
        assert_eq!(
            wizard.panel(3).unwrap().field("signatureDate").unwrap().value,
            "2023-12-31"
        );
    }
}
