//! User-facing notices built from validation and submission outcomes.
//!
//! Hosts decide how a notice is shown by implementing [`Notifier`].

use crate::domain::{SubmitError, WizardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice the page announces for a failed Next, if any.
    ///
    /// Blank fields are flagged in place and navigation errors are left to
    /// the host.
    pub fn for_wizard_error(error: &WizardError) -> Option<Self> {
        match error {
            WizardError::Validation(e) if e.needs_notice() => Some(Self::error(e.to_string())),
            WizardError::Validation(_) | WizardError::Navigation(_) => None,
        }
    }

    /// Notice the page announces for a failed submit, if any.
    pub fn for_submit_error(error: &SubmitError) -> Option<Self> {
        match error {
            SubmitError::Validation(e) if !e.needs_notice() => None,
            other => Some(Self::error(other.to_string())),
        }
    }
}

impl From<&SubmitError> for Notice {
    fn from(error: &SubmitError) -> Self {
        Notice::error(error.to_string())
    }
}

impl From<&WizardError> for Notice {
    fn from(error: &WizardError) -> Self {
        Notice::error(error.to_string())
    }
}

/// Presents notices to the user.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}
