use thiserror::Error;

/// A step failed client-side validation.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select at least one service.")]
    NoServiceSelected,
    #[error("Please fill in all required fields.")]
    MissingRequiredFields { step: usize, fields: Vec<String> },
}

impl ValidationError {
    /// Whether the failure needs an explicit notice.
    ///
    /// Missing fields are already flagged in place, so the page only
    /// announces the service rule.
    pub fn needs_notice(&self) -> bool {
        matches!(self, ValidationError::NoServiceSelected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Already on the first step")]
    AtFirstStep,
    #[error("Already on the last step")]
    AtLastStep,
    #[error("Step {requested} is out of range (1..={total})")]
    StepOutOfRange { requested: usize, total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Please agree to the Terms & Conditions.")]
    TermsNotAgreed,
    #[error("Please provide your signature.")]
    SignatureMissing,
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Could not read form definition: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid form definition - {0}")]
    Json(#[from] serde_json::Error),
    #[error("Form definition has no steps")]
    NoSteps,
    #[error("Step ordinal {0} appears more than once")]
    DuplicateStep(usize),
    #[error("Step ordinals must run from 1 without gaps (expected {expected}, found {found})")]
    StepGap { expected: usize, found: usize },
}

pub type DefinitionResult<T> = Result<T, DefinitionError>;
